// src/display/mod.rs
pub mod buffer;
pub mod error;
pub mod fft;
pub mod plot;
pub mod render;
pub mod resample;
pub mod scheduler;
pub mod settings;
pub mod source;
pub use buffer::{window_size, RollingBuffer, TimeAxis};
pub use error::DisplayError;
pub use fft::{SpectrumEngine, SpectrumSnapshot, Transformer};
pub use plot::{render_frame_png, PlotStyle};
pub use render::{LatestFrames, PlotFrame, Renderer};
pub use resample::{effective_rate, Resampler};
pub use scheduler::{FrameScheduler, TickOutcome, TickReport};
pub use settings::{
    AcquisitionState, ControlPanel, ControlSnapshot, DisplaySettings, PendingOp, SettingCommand,
};
pub use source::{Channel, ManualSource, SampleSource};

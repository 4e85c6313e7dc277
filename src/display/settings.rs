use std::sync::{Arc, Mutex, MutexGuard};
use log::{info, warn};
use crate::display::{Channel, SampleSource};
pub const MAX_FILTER_SELECTION: u8 = 3;
pub const MAX_GAIN_SELECTION: u8 = 7;
pub const MIN_WINDOW_SECONDS: f64 = 1.0;
pub const MAX_WINDOW_SECONDS: f64 = 10.0;
/// How the display shows the rolling window. Shared by both channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaySettings {
    pub window_seconds: f64,
    pub spectrum_mode: bool,
    pub single_channel_mode: bool,
}
impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_seconds: 5.0,
            spectrum_mode: false,
            single_channel_mode: false,
        }
    }
}
/// Converter settings as last forwarded to the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquisitionState {
    pub filter_selection: u8,
    pub gain_selection: u8,
    pub channel_enabled: [bool; 2],
}
impl AcquisitionState {
    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.channel_enabled[channel.index()]
    }
}
impl Default for AcquisitionState {
    fn default() -> Self {
        Self {
            filter_selection: 0,
            gain_selection: 0,
            channel_enabled: [true; 2],
        }
    }
}
/// Buffer work requested by setting changes, consumed once by the next tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PendingOp {
    #[default]
    None,
    Resize,
    Resample,
    Both,
}
impl PendingOp {
    pub fn with_resize(self) -> Self {
        match self {
            PendingOp::None | PendingOp::Resize => PendingOp::Resize,
            PendingOp::Resample | PendingOp::Both => PendingOp::Both,
        }
    }
    pub fn with_resample(self) -> Self {
        match self {
            PendingOp::None | PendingOp::Resample => PendingOp::Resample,
            PendingOp::Resize | PendingOp::Both => PendingOp::Both,
        }
    }
    pub fn resize(self) -> bool {
        matches!(self, PendingOp::Resize | PendingOp::Both)
    }
    pub fn resample(self) -> bool {
        matches!(self, PendingOp::Resample | PendingOp::Both)
    }
}
/// Plain setting values coming from whatever input layer drives the display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingCommand {
    Filter(u8),
    Gain(u8),
    WindowSeconds(f64),
    SpectrumMode(bool),
    SingleChannelMode(bool),
}
/// What a tick reads from the control state at its start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSnapshot {
    pub display: DisplaySettings,
    pub acquisition: AcquisitionState,
    pub pending: PendingOp,
}
#[derive(Debug, Default)]
struct ControlState {
    display: DisplaySettings,
    acquisition: AcquisitionState,
    pending: PendingOp,
}
/// Setting-change handlers. They write settings and pending flags, forward
/// converter settings to the source, and never touch buffers.
pub struct ControlPanel<S: SampleSource> {
    state: Arc<Mutex<ControlState>>,
    source: Arc<S>,
}
impl<S: SampleSource> Clone for ControlPanel<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            source: Arc::clone(&self.source),
        }
    }
}
impl<S: SampleSource> ControlPanel<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ControlState::default())),
            source,
        }
    }
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
    pub fn apply(&self, command: SettingCommand) {
        match command {
            SettingCommand::Filter(level) => self.set_filter_selection(level),
            SettingCommand::Gain(level) => self.set_gain_selection(level),
            SettingCommand::WindowSeconds(seconds) => self.set_window_duration(seconds),
            SettingCommand::SpectrumMode(on) => self.set_spectrum_mode(on),
            SettingCommand::SingleChannelMode(on) => self.set_single_channel_mode(on),
        }
    }
    pub fn set_filter_selection(&self, level: u8) {
        let level = clamp_level("filter", level, MAX_FILTER_SELECTION);
        let mut state = self.lock();
        if state.acquisition.filter_selection == level {
            return;
        }
        state.acquisition.filter_selection = level;
        for channel in Channel::ALL {
            self.source.set_filter(level, channel);
        }
        state.pending = state.pending.with_resample();
        info!("filter selection: {level}");
    }
    pub fn set_gain_selection(&self, level: u8) {
        let level = clamp_level("gain", level, MAX_GAIN_SELECTION);
        let mut state = self.lock();
        if state.acquisition.gain_selection == level {
            return;
        }
        state.acquisition.gain_selection = level;
        for channel in Channel::ALL {
            self.source.set_gain(level, channel);
        }
        info!("gain selection: {level}");
    }
    /// Rounds to whole seconds within 1..=10.
    pub fn set_window_duration(&self, seconds: f64) {
        if !seconds.is_finite() {
            warn!("ignoring window length {seconds}");
            return;
        }
        let rounded = seconds.round();
        let clamped = rounded.clamp(MIN_WINDOW_SECONDS, MAX_WINDOW_SECONDS);
        if clamped != rounded {
            warn!("window length {seconds} clamped to {clamped} seconds");
        }
        let mut state = self.lock();
        if state.display.window_seconds == clamped {
            return;
        }
        state.display.window_seconds = clamped;
        state.pending = state.pending.with_resize();
        info!("length selection: {clamped} seconds");
    }
    pub fn set_spectrum_mode(&self, on: bool) {
        let mut state = self.lock();
        if state.display.spectrum_mode != on {
            state.display.spectrum_mode = on;
            info!("spectrum mode: {}", on_off(on));
        }
    }
    pub fn set_single_channel_mode(&self, on: bool) {
        let mut state = self.lock();
        if state.display.single_channel_mode == on {
            return;
        }
        state.display.single_channel_mode = on;
        state.acquisition.channel_enabled[Channel::Second.index()] = !on;
        self.source.set_channel_enabled(!on, Channel::Second);
        state.pending = state.pending.with_resample();
        info!("single channel mode: {}", on_off(on));
    }
    /// Asks the next tick to re-derive the rate from the source, e.g. at startup.
    pub fn request_resample(&self) {
        let mut state = self.lock();
        state.pending = state.pending.with_resample();
    }
    pub fn settings(&self) -> (DisplaySettings, AcquisitionState) {
        let state = self.lock();
        (state.display, state.acquisition)
    }
    /// Copies the settings and takes the pending work in one step.
    pub fn snapshot(&self) -> ControlSnapshot {
        let mut state = self.lock();
        ControlSnapshot {
            display: state.display,
            acquisition: state.acquisition,
            pending: std::mem::take(&mut state.pending),
        }
    }
    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
fn clamp_level(name: &str, level: u8, max: u8) -> u8 {
    if level > max {
        warn!("{name} selection {level} clamped to {max}");
        max
    } else {
        level
    }
}
fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ManualSource;
    fn panel() -> ControlPanel<ManualSource> {
        ControlPanel::new(Arc::new(ManualSource::new(50.0, 50.0)))
    }
    #[test]
    fn pending_ops_merge() {
        assert_eq!(PendingOp::None.with_resize(), PendingOp::Resize);
        assert_eq!(PendingOp::Resize.with_resample(), PendingOp::Both);
        assert_eq!(PendingOp::Resample.with_resize(), PendingOp::Both);
        assert!(PendingOp::Both.resize() && PendingOp::Both.resample());
        assert!(!PendingOp::None.resize() && !PendingOp::None.resample());
    }
    #[test]
    fn filter_change_forwards_and_requests_resample() {
        let panel = panel();
        panel.set_filter_selection(2);
        assert_eq!(panel.source().filter(Channel::First), 2);
        assert_eq!(panel.source().filter(Channel::Second), 2);
        let snapshot = panel.snapshot();
        assert_eq!(snapshot.pending, PendingOp::Resample);
        assert_eq!(snapshot.acquisition.filter_selection, 2);
        assert_eq!(panel.snapshot().pending, PendingOp::None);
        panel.set_filter_selection(2);
        assert_eq!(panel.snapshot().pending, PendingOp::None);
    }
    #[test]
    fn out_of_range_settings_are_clamped() {
        let panel = panel();
        panel.apply(SettingCommand::Filter(9));
        panel.apply(SettingCommand::Gain(200));
        panel.apply(SettingCommand::WindowSeconds(42.0));
        let (display, acquisition) = panel.settings();
        assert_eq!(acquisition.filter_selection, MAX_FILTER_SELECTION);
        assert_eq!(acquisition.gain_selection, MAX_GAIN_SELECTION);
        assert_eq!(display.window_seconds, MAX_WINDOW_SECONDS);
        panel.apply(SettingCommand::WindowSeconds(0.2));
        assert_eq!(panel.settings().0.window_seconds, MIN_WINDOW_SECONDS);
        panel.apply(SettingCommand::WindowSeconds(f64::NAN));
        assert_eq!(panel.settings().0.window_seconds, MIN_WINDOW_SECONDS);
    }
    #[test]
    fn window_rounds_and_requests_resize_once() {
        let panel = panel();
        panel.set_window_duration(7.4);
        assert_eq!(panel.settings().0.window_seconds, 7.0);
        assert_eq!(panel.snapshot().pending, PendingOp::Resize);
        panel.set_window_duration(6.6);
        assert_eq!(panel.snapshot().pending, PendingOp::None);
    }
    #[test]
    fn gain_does_not_request_buffer_work() {
        let panel = panel();
        panel.set_gain_selection(4);
        assert_eq!(panel.source().gain(Channel::Second), 4);
        assert_eq!(panel.snapshot().pending, PendingOp::None);
    }
    #[test]
    fn single_channel_disables_second_input() {
        let panel = panel();
        panel.set_window_duration(3.0);
        panel.set_single_channel_mode(true);
        assert!(!panel.source().is_enabled(Channel::Second));
        let snapshot = panel.snapshot();
        assert_eq!(snapshot.pending, PendingOp::Both);
        assert!(!snapshot.acquisition.is_enabled(Channel::Second));
        panel.set_single_channel_mode(false);
        assert!(panel.source().is_enabled(Channel::Second));
    }
}

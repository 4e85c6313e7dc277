// src/lib.rs
//! Rolling-window display pipeline for a two-channel ADC monitor: buffers,
//! band-limited resampling, spectra and the frame tick that drives them.
pub mod adc;
pub mod config;
pub mod display;
pub mod types;

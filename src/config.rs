// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use serde::Deserialize;
use crate::display::{DisplaySettings, SettingCommand};
/// Tone/noise parameters of the simulated converter.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tone_hz: [f64; 2],
    pub amplitude: f64,
    pub noise: f64,
}
impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tone_hz: [0.5, 0.2],
            amplitude: 1.0,
            noise: 0.05,
        }
    }
}
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub tick_interval_ms: u64,
    /// 0 runs until `quit` is read from stdin.
    pub run_seconds: u64,
    pub window_seconds: f64,
    pub initial_rate_hz: f64,
    pub filter_selection: u8,
    pub gain_selection: u8,
    pub spectrum_mode: bool,
    pub single_channel_mode: bool,
    pub snapshot_dir: PathBuf,
    pub simulation: SimulationConfig,
}
impl Default for MonitorConfig {
    fn default() -> Self {
        let display = DisplaySettings::default();
        Self {
            tick_interval_ms: 40,
            run_seconds: 10,
            window_seconds: display.window_seconds,
            initial_rate_hz: 8.333333333,
            filter_selection: 0,
            gain_selection: 0,
            spectrum_mode: display.spectrum_mode,
            single_channel_mode: display.single_channel_mode,
            snapshot_dir: PathBuf::from("snapshots"),
            simulation: SimulationConfig::default(),
        }
    }
}
impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
    pub fn run_duration(&self) -> Option<Duration> {
        (self.run_seconds > 0).then(|| Duration::from_secs(self.run_seconds))
    }
    /// Initial settings as commands, so they go through the same clamping as
    /// changes made while running.
    pub fn initial_commands(&self) -> Vec<SettingCommand> {
        vec![
            SettingCommand::Filter(self.filter_selection),
            SettingCommand::Gain(self.gain_selection),
            SettingCommand::WindowSeconds(self.window_seconds),
            SettingCommand::SpectrumMode(self.spectrum_mode),
            SettingCommand::SingleChannelMode(self.single_channel_mode),
        ]
    }
}

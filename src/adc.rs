// src/adc.rs
use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::{debug, info};
use rand::Rng;
use crate::config::SimulationConfig;
use crate::display::source::drain_newest;
use crate::display::{effective_rate, Channel, SampleSource};
/// Converter output rate for each filter selection.
pub const FILTER_RATES_HZ: [f64; 4] = [50.0, 60.0, 250.0, 500.0];
/// Pending samples kept per channel when the display stops draining.
const MAX_BACKLOG_SECONDS: f64 = 10.0;
const POLL_INTERVAL: Duration = Duration::from_millis(5);
struct AdcChannel {
    pending: Mutex<VecDeque<f64>>,
    filter: AtomicU8,
    gain: AtomicU8,
    enabled: AtomicBool,
}
impl AdcChannel {
    fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            filter: AtomicU8::new(0),
            gain: AtomicU8::new(0),
            enabled: AtomicBool::new(true),
        }
    }
    fn rate_hz(&self) -> f64 {
        let filter = self.filter.load(Ordering::Relaxed) as usize;
        FILTER_RATES_HZ[filter.min(FILTER_RATES_HZ.len() - 1)]
    }
    fn gain_factor(&self) -> f64 {
        f64::from(1u32 << self.gain.load(Ordering::Relaxed).min(7))
    }
    fn push(&self, sample: f64, capacity: usize) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if pending.len() >= capacity {
            pending.pop_front();
        }
        pending.push_back(sample);
    }
}
struct AdcShared {
    channels: [AdcChannel; 2],
    running: AtomicBool,
}
/// Two-channel multiplexed converter simulated on a background thread.
///
/// Each enabled channel produces a tone plus noise, paced at the rate the
/// display expects from the multiplexed converter.
pub struct SimulatedAdc {
    shared: Arc<AdcShared>,
    worker: Option<JoinHandle<()>>,
}
impl SimulatedAdc {
    pub fn start(config: SimulationConfig) -> Self {
        let shared = Arc::new(AdcShared {
            channels: [AdcChannel::new(), AdcChannel::new()],
            running: AtomicBool::new(true),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || acquisition_loop(&worker_shared, &config));
        info!("simulated ADC started");
        Self {
            shared,
            worker: Some(worker),
        }
    }
    fn channel(&self, channel: Channel) -> &AdcChannel {
        &self.shared.channels[channel.index()]
    }
}
impl Drop for SimulatedAdc {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("simulated ADC stopped");
    }
}
impl SampleSource for SimulatedAdc {
    fn append_available(&self, channel: Channel, max_count: usize, out: &mut Vec<f64>) -> usize {
        let mut pending = self
            .channel(channel)
            .pending
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        drain_newest(&mut pending, max_count, out)
    }
    fn current_sample_rate(&self, channel: Channel) -> f64 {
        self.channel(channel).rate_hz()
    }
    fn set_filter(&self, level: u8, channel: Channel) {
        self.channel(channel).filter.store(level, Ordering::Relaxed);
    }
    fn set_gain(&self, level: u8, channel: Channel) {
        self.channel(channel).gain.store(level, Ordering::Relaxed);
    }
    fn set_channel_enabled(&self, enabled: bool, channel: Channel) {
        self.channel(channel).enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.channel(channel)
                .pending
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .clear();
        }
    }
}
fn acquisition_loop(shared: &AdcShared, config: &SimulationConfig) {
    let mut rng = rand::thread_rng();
    let mut due = [0.0f64; 2];
    let mut produced = [0u64; 2];
    let mut last = Instant::now();
    while shared.running.load(Ordering::Acquire) {
        thread::sleep(POLL_INTERVAL);
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;
        let [first, second] = &shared.channels;
        let second_enabled = second.enabled.load(Ordering::Relaxed);
        let rate_hz = effective_rate(first.rate_hz(), second.rate_hz(), !second_enabled);
        let capacity = (rate_hz * MAX_BACKLOG_SECONDS).ceil() as usize;
        for channel in Channel::ALL {
            let adc = &shared.channels[channel.index()];
            let i = channel.index();
            if !adc.enabled.load(Ordering::Relaxed) {
                due[i] = 0.0;
                continue;
            }
            due[i] += elapsed * rate_hz;
            let gain = adc.gain_factor();
            while due[i] >= 1.0 {
                due[i] -= 1.0;
                let t = produced[i] as f64 / rate_hz;
                let tone = config.amplitude * (TAU * config.tone_hz[i] * t).sin();
                let noise = config.noise * rng.gen_range(-1.0..=1.0);
                adc.push(gain * (tone + noise), capacity.max(1));
                produced[i] += 1;
            }
        }
    }
    debug!("acquisition loop exited after {} + {} samples", produced[0], produced[1]);
}

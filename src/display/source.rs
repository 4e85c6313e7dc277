use std::collections::VecDeque;
use std::sync::Mutex;
/// One of the two analog inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    First,
    Second,
}
impl Channel {
    pub const ALL: [Channel; 2] = [Channel::First, Channel::Second];
    pub fn index(self) -> usize {
        match self {
            Channel::First => 0,
            Channel::Second => 1,
        }
    }
}
/// Acquisition running on its own thread. Every method is non-blocking apart
/// from the short critical section around a single queue operation.
pub trait SampleSource: Send + Sync {
    /// Moves up to `max_count` of the newest pending samples for `channel` into
    /// `out`, oldest first. Older pending samples beyond `max_count` are dropped.
    fn append_available(&self, channel: Channel, max_count: usize, out: &mut Vec<f64>) -> usize;
    fn current_sample_rate(&self, channel: Channel) -> f64;
    fn set_filter(&self, level: u8, channel: Channel);
    fn set_gain(&self, level: u8, channel: Channel);
    fn set_channel_enabled(&self, enabled: bool, channel: Channel);
}
/// Moves the newest `max_count` entries of `queue` into `out`.
pub(crate) fn drain_newest(queue: &mut VecDeque<f64>, max_count: usize, out: &mut Vec<f64>) -> usize {
    if queue.len() > max_count {
        let stale = queue.len() - max_count;
        queue.drain(..stale);
    }
    let count = queue.len();
    out.extend(queue.drain(..));
    count
}
#[derive(Debug)]
struct ManualState {
    pending: [VecDeque<f64>; 2],
    rates_hz: [f64; 2],
    filters: [u8; 2],
    gains: [u8; 2],
    enabled: [bool; 2],
}
/// In-memory source for deterministic playback and tests.
#[derive(Debug)]
pub struct ManualSource {
    state: Mutex<ManualState>,
}
impl ManualSource {
    pub fn new(first_rate_hz: f64, second_rate_hz: f64) -> Self {
        Self {
            state: Mutex::new(ManualState {
                pending: [VecDeque::new(), VecDeque::new()],
                rates_hz: [first_rate_hz, second_rate_hz],
                filters: [0; 2],
                gains: [0; 2],
                enabled: [true; 2],
            }),
        }
    }
    pub fn push(&self, channel: Channel, samples: &[f64]) {
        let mut state = self.lock();
        state.pending[channel.index()].extend(samples.iter().copied());
    }
    pub fn set_rate(&self, channel: Channel, rate_hz: f64) {
        self.lock().rates_hz[channel.index()] = rate_hz;
    }
    pub fn pending(&self, channel: Channel) -> usize {
        self.lock().pending[channel.index()].len()
    }
    pub fn filter(&self, channel: Channel) -> u8 {
        self.lock().filters[channel.index()]
    }
    pub fn gain(&self, channel: Channel) -> u8 {
        self.lock().gains[channel.index()]
    }
    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.lock().enabled[channel.index()]
    }
    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A panic while holding this lock leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
impl SampleSource for ManualSource {
    fn append_available(&self, channel: Channel, max_count: usize, out: &mut Vec<f64>) -> usize {
        drain_newest(&mut self.lock().pending[channel.index()], max_count, out)
    }
    fn current_sample_rate(&self, channel: Channel) -> f64 {
        self.lock().rates_hz[channel.index()]
    }
    fn set_filter(&self, level: u8, channel: Channel) {
        self.lock().filters[channel.index()] = level;
    }
    fn set_gain(&self, level: u8, channel: Channel) {
        self.lock().gains[channel.index()] = level;
    }
    fn set_channel_enabled(&self, enabled: bool, channel: Channel) {
        self.lock().enabled[channel.index()] = enabled;
    }
}

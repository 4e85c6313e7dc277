use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use log::{debug, warn};
use crate::display::buffer::{validate_rate, window_size};
use crate::display::resample::effective_rate;
use crate::display::{
    Channel, ControlPanel, ControlSnapshot, DisplayError, Renderer, Resampler, RollingBuffer,
    SampleSource, SpectrumEngine, TimeAxis,
};
/// What a single tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// The previous tick was still running; nothing was touched.
    Skipped,
    Rendered(TickReport),
}
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub resized: bool,
    pub resampled: bool,
    pub appended: [usize; 2],
    pub size: usize,
    pub rate_hz: f64,
    pub spectrum: bool,
}
/// Held while a tick runs; dropping it makes the scheduler idle again.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}
impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
struct FrameState {
    buffers: [RollingBuffer; 2],
    axis: TimeAxis,
    rate_hz: f64,
    resampler: Resampler,
    spectrum: SpectrumEngine,
    incoming: Vec<f64>,
    samples_ingested: u64,
}
/// Periodic driver of the display: applies pending resize/resample work, drains
/// the source and publishes one curve per enabled channel.
///
/// Ticks may be triggered from any thread. A tick that arrives while another is
/// still running is dropped rather than queued.
pub struct FrameScheduler<S: SampleSource> {
    control: ControlPanel<S>,
    busy: AtomicBool,
    frame: Mutex<FrameState>,
}
impl<S: SampleSource> FrameScheduler<S> {
    pub fn new(control: ControlPanel<S>, initial_rate_hz: f64) -> Result<Self, DisplayError> {
        validate_rate(initial_rate_hz)?;
        let (display, _) = control.settings();
        let size = window_size(display.window_seconds, initial_rate_hz);
        let frame = FrameState {
            buffers: [RollingBuffer::zeroed(size), RollingBuffer::zeroed(size)],
            axis: TimeAxis::new(size, initial_rate_hz)?,
            rate_hz: initial_rate_hz,
            resampler: Resampler::new(),
            spectrum: SpectrumEngine::new(),
            incoming: Vec::with_capacity(size),
            samples_ingested: 0,
        };
        Ok(Self {
            control,
            busy: AtomicBool::new(false),
            frame: Mutex::new(frame),
        })
    }
    pub fn control(&self) -> &ControlPanel<S> {
        &self.control
    }
    /// Marks the scheduler busy, or returns `None` if a tick is already running.
    pub fn try_enter(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
    pub fn tick(&self, renderer: &mut impl Renderer) -> Result<TickOutcome, DisplayError> {
        let Some(_busy) = self.try_enter() else {
            debug!("frame skipped: previous tick still running");
            return Ok(TickOutcome::Skipped);
        };
        let snapshot = self.control.snapshot();
        let mut frame = self.lock_frame();
        let resized = snapshot.pending.resize() && self.apply_resize(&mut frame, &snapshot);
        let resampled = snapshot.pending.resample() && self.apply_resample(&mut frame, &snapshot)?;
        let appended = self.drain_source(&mut frame, &snapshot);
        let state = &mut *frame;
        for channel in active_channels(&snapshot) {
            let samples = state.buffers[channel.index()].samples();
            if snapshot.display.spectrum_mode {
                let spectrum = state.spectrum.compute(samples, state.rate_hz)?;
                renderer.publish(channel, &spectrum.frequencies_hz, &spectrum.magnitudes);
            } else {
                renderer.publish(channel, state.axis.values(), samples);
            }
        }
        Ok(TickOutcome::Rendered(TickReport {
            resized,
            resampled,
            appended,
            size: state.axis.len(),
            rate_hz: state.rate_hz,
            spectrum: snapshot.display.spectrum_mode,
        }))
    }
    pub fn size(&self) -> usize {
        self.lock_frame().axis.len()
    }
    pub fn rate_hz(&self) -> f64 {
        self.lock_frame().rate_hz
    }
    pub fn samples(&self, channel: Channel) -> Vec<f64> {
        self.lock_frame().buffers[channel.index()].samples().to_vec()
    }
    pub fn time_axis(&self) -> Vec<f64> {
        self.lock_frame().axis.values().to_vec()
    }
    pub fn samples_ingested(&self) -> u64 {
        self.lock_frame().samples_ingested
    }
    /// Window length changed: truncate or zero-pad at the current rate.
    fn apply_resize(&self, frame: &mut FrameState, snapshot: &ControlSnapshot) -> bool {
        let new_size = window_size(snapshot.display.window_seconds, frame.rate_hz);
        let old_size = frame.axis.len();
        for buffer in &mut frame.buffers {
            buffer.resize(new_size);
        }
        frame.axis.resize(new_size);
        debug!("resized display buffers {old_size} -> {new_size}");
        new_size != old_size
    }
    /// Acquisition rate may have changed: re-express the buffers at the new rate.
    fn apply_resample(
        &self,
        frame: &mut FrameState,
        snapshot: &ControlSnapshot,
    ) -> Result<bool, DisplayError> {
        let source = self.control.source();
        let first = source.current_sample_rate(Channel::First);
        let second = source.current_sample_rate(Channel::Second);
        let rate_hz = effective_rate(first, second, snapshot.display.single_channel_mode);
        if validate_rate(rate_hz).is_err() {
            warn!("source reported unusable rates {first} Hz / {second} Hz; keeping {} Hz", frame.rate_hz);
            return Ok(false);
        }
        let old_size = frame.axis.len();
        let new_size = window_size(snapshot.display.window_seconds, rate_hz);
        let resampled = new_size != old_size;
        let mut replacements = Vec::with_capacity(frame.buffers.len());
        if resampled {
            for channel in Channel::ALL {
                if snapshot.acquisition.is_enabled(channel) {
                    let buffer = &frame.buffers[channel.index()];
                    let content = frame.resampler.resample(buffer.samples(), new_size)?;
                    replacements.push((channel, content));
                }
            }
        }
        // All channels are computed before any buffer is replaced.
        for (channel, content) in replacements {
            frame.buffers[channel.index()].replace(content);
        }
        for channel in Channel::ALL {
            if !snapshot.acquisition.is_enabled(channel) {
                // Nothing to interpolate for a channel that is not sampling.
                frame.buffers[channel.index()].clear_to(new_size);
            }
        }
        if resampled {
            debug!("resampled display buffers {old_size} -> {new_size} at {rate_hz:.3} Hz");
        }
        if resampled || rate_hz != frame.rate_hz {
            frame.axis.rebuild(new_size, rate_hz)?;
            frame.rate_hz = rate_hz;
        }
        Ok(resampled)
    }
    fn drain_source(&self, frame: &mut FrameState, snapshot: &ControlSnapshot) -> [usize; 2] {
        let source = self.control.source();
        let mut appended = [0; 2];
        for channel in active_channels(snapshot) {
            let buffer = &mut frame.buffers[channel.index()];
            frame.incoming.clear();
            source.append_available(channel, buffer.len(), &mut frame.incoming);
            appended[channel.index()] = buffer.append(&frame.incoming);
        }
        let total = (appended[0] + appended[1]) as u64;
        frame.samples_ingested += total;
        if total > 0 {
            debug!(
                "appended {} + {} samples ({} total)",
                appended[0], appended[1], frame.samples_ingested
            );
        }
        appended
    }
    fn lock_frame(&self) -> MutexGuard<'_, FrameState> {
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
fn active_channels(snapshot: &ControlSnapshot) -> impl Iterator<Item = Channel> {
    let single = snapshot.display.single_channel_mode;
    Channel::ALL
        .into_iter()
        .filter(move |channel| !(single && *channel == Channel::Second))
}
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;
    use crate::display::{LatestFrames, ManualSource};
    const STARTUP_RATE_HZ: f64 = 8.333333333;
    fn scheduler(first_hz: f64, second_hz: f64) -> FrameScheduler<ManualSource> {
        let source = Arc::new(ManualSource::new(first_hz, second_hz));
        FrameScheduler::new(ControlPanel::new(source), STARTUP_RATE_HZ).unwrap()
    }
    fn report(outcome: TickOutcome) -> TickReport {
        match outcome {
            TickOutcome::Rendered(report) => report,
            TickOutcome::Skipped => panic!("tick was skipped"),
        }
    }
    fn assert_axis_exact(scheduler: &FrameScheduler<ManualSource>) {
        let size = scheduler.size();
        let rate = scheduler.rate_hz();
        let axis = scheduler.time_axis();
        assert_eq!(axis.len(), size);
        for (i, x) in axis.iter().enumerate() {
            assert_eq!(*x, (size - i - 1) as f64 / rate);
        }
    }
    #[test]
    fn starts_with_five_seconds_at_startup_rate() {
        let scheduler = scheduler(50.0, 50.0);
        assert_eq!(scheduler.size(), 41);
        assert_eq!(scheduler.samples(Channel::First), vec![0.0; 41]);
        assert_axis_exact(&scheduler);
    }
    #[test]
    fn drains_new_samples_and_publishes_time_series() {
        let scheduler = scheduler(50.0, 50.0);
        let source = scheduler.control().source();
        source.push(Channel::First, &[1.0, 2.0, 3.0]);
        source.push(Channel::Second, &[4.0]);
        let mut frames = LatestFrames::new();
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert_eq!(report.appended, [3, 1]);
        assert!(!report.resized && !report.resampled);
        let first = frames.frame(Channel::First).unwrap();
        assert_eq!(first.x, scheduler.time_axis());
        assert_eq!(&first.y[38..], &[1.0, 2.0, 3.0]);
        assert_eq!(frames.frame(Channel::Second).unwrap().y[40], 4.0);
        assert_eq!(frames.publish_count(), 2);
        assert_eq!(scheduler.samples_ingested(), 4);
    }
    #[test]
    fn quiet_source_is_not_an_error() {
        let scheduler = scheduler(50.0, 50.0);
        let mut frames = LatestFrames::new();
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert_eq!(report.appended, [0, 0]);
        assert_eq!(frames.publish_count(), 2);
    }
    #[test]
    fn window_change_resizes_at_current_rate() {
        let scheduler = scheduler(50.0, 50.0);
        let source = Arc::clone(scheduler.control().source());
        let ramp: Vec<f64> = (1..=41).map(|v| v as f64).collect();
        source.push(Channel::First, &ramp);
        let mut frames = LatestFrames::new();
        scheduler.tick(&mut frames).unwrap();
        scheduler.control().set_window_duration(10.0);
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert!(report.resized && !report.resampled);
        assert_eq!(scheduler.size(), 83);
        let samples = scheduler.samples(Channel::First);
        assert!(samples[..42].iter().all(|v| *v == 0.0));
        assert_eq!(&samples[42..], ramp.as_slice());
        assert_axis_exact(&scheduler);
        let again = report_of_next_tick(&scheduler);
        assert!(!again.resized);
    }
    fn report_of_next_tick(scheduler: &FrameScheduler<ManualSource>) -> TickReport {
        report(scheduler.tick(&mut LatestFrames::new()).unwrap())
    }
    #[test]
    fn single_channel_mode_uses_first_rate() {
        let scheduler = scheduler(100.0, 50.0);
        scheduler.control().set_single_channel_mode(true);
        let mut frames = LatestFrames::new();
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert!(report.resampled);
        assert_eq!(scheduler.rate_hz(), 100.0);
        assert_eq!(scheduler.size(), 500);
        assert_eq!(scheduler.samples(Channel::Second).len(), 500);
        assert_axis_exact(&scheduler);
        assert!(frames.frame(Channel::Second).is_none());
        assert_eq!(frames.publish_count(), 1);
    }
    #[test]
    fn dual_channel_rate_follows_multiplexing_formula() {
        let scheduler = scheduler(100.0, 50.0);
        scheduler.control().request_resample();
        let report = report_of_next_tick(&scheduler);
        let expected = 1.0 / ((1.0 / 100.0 + 1.0 / 50.0) * 3.0);
        assert_eq!(scheduler.rate_hz(), expected);
        assert!((report.rate_hz - 11.1111).abs() < 1e-3);
        assert_eq!(scheduler.size(), 55);
        assert_axis_exact(&scheduler);
    }
    #[test]
    fn rate_change_without_size_change_rebuilds_axis() {
        let scheduler = scheduler(50.0, 50.0);
        scheduler.control().source().set_rate(Channel::First, 50.1);
        scheduler.control().request_resample();
        let report = report_of_next_tick(&scheduler);
        assert!(!report.resampled);
        assert_eq!(scheduler.size(), 41);
        assert!(scheduler.rate_hz() != STARTUP_RATE_HZ);
        assert_axis_exact(&scheduler);
    }
    #[test]
    fn resize_runs_before_resample_in_one_tick() {
        let scheduler = scheduler(10.0, 10.0);
        scheduler.control().set_window_duration(10.0);
        scheduler.control().set_single_channel_mode(true);
        let report = report_of_next_tick(&scheduler);
        assert!(report.resized && report.resampled);
        assert_eq!(scheduler.rate_hz(), 10.0);
        assert_eq!(scheduler.size(), 100);
        assert_axis_exact(&scheduler);
    }
    #[test]
    fn busy_tick_is_skipped_and_work_kept() {
        let scheduler = scheduler(50.0, 50.0);
        scheduler.control().set_window_duration(2.0);
        scheduler.control().source().push(Channel::First, &[5.0]);
        let mut frames = LatestFrames::new();
        {
            let _busy = scheduler.try_enter().unwrap();
            assert!(scheduler.is_busy());
            assert_eq!(scheduler.tick(&mut frames).unwrap(), TickOutcome::Skipped);
            assert_eq!(frames.publish_count(), 0);
            assert_eq!(scheduler.size(), 41);
            assert_eq!(scheduler.samples(Channel::First), vec![0.0; 41]);
            assert_eq!(scheduler.control().source().pending(Channel::First), 1);
        }
        assert!(!scheduler.is_busy());
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert!(report.resized);
        assert_eq!(report.appended[0], 1);
        assert_eq!(scheduler.size(), 16);
    }
    #[test]
    fn spectrum_mode_publishes_one_sided_spectrum() {
        let scheduler = scheduler(50.0, 50.0);
        scheduler.control().set_spectrum_mode(true);
        let mut frames = LatestFrames::new();
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert!(report.spectrum);
        let frame = frames.frame(Channel::First).unwrap();
        assert_eq!(frame.y.len(), 41 / 2 + 1);
        assert_eq!(frame.x.len(), 41 / 2 + 1);
        assert!(frame.y.iter().all(|m| *m == 0.0));
        assert!((frame.x[20] - STARTUP_RATE_HZ / 2.0).abs() < 1e-9);
    }
    #[test]
    fn single_channel_spectrum_skips_second_channel() {
        let scheduler = scheduler(50.0, 50.0);
        let source = scheduler.control().source();
        source.push(Channel::Second, &[3.0, 1.0]);
        scheduler.control().set_spectrum_mode(true);
        scheduler.control().set_single_channel_mode(true);
        let mut frames = LatestFrames::new();
        let report = report(scheduler.tick(&mut frames).unwrap());
        assert!(report.spectrum);
        assert_eq!(report.appended[1], 0);
        assert_eq!(frames.publish_count(), 1);
        assert!(frames.frame(Channel::Second).is_none());
        let size = scheduler.size();
        assert_eq!(frames.frame(Channel::First).unwrap().y.len(), size / 2 + 1);
        assert_eq!(scheduler.samples(Channel::Second), vec![0.0; size]);
    }
    #[test]
    fn disabled_channel_is_cleared_when_rate_changes() {
        let scheduler = scheduler(50.0, 50.0);
        scheduler.control().source().push(Channel::Second, &[2.0; 41]);
        scheduler.tick(&mut LatestFrames::new()).unwrap();
        scheduler.control().source().set_rate(Channel::First, 8.3);
        scheduler.control().set_single_channel_mode(true);
        let report = report_of_next_tick(&scheduler);
        assert!(!report.resampled);
        assert_eq!(scheduler.size(), 41);
        assert_eq!(scheduler.samples(Channel::Second), vec![0.0; 41]);
    }
    #[test]
    fn rejects_invalid_startup_rate() {
        let source = Arc::new(ManualSource::new(50.0, 50.0));
        assert!(FrameScheduler::new(ControlPanel::new(source), 0.0).is_err());
    }
}

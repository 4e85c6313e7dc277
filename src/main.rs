// src/main.rs
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use adcscope::adc::SimulatedAdc;
use adcscope::config::MonitorConfig;
use adcscope::display::{
    render_frame_png, Channel, ControlPanel, DisplayError, FrameScheduler, LatestFrames,
    PlotStyle, SampleSource, TickOutcome,
};
use adcscope::types::ConsoleCommand;
const COMMAND_POLL: Duration = Duration::from_millis(100);
fn main() -> Result<()> {
    env_logger::init();
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = MonitorConfig::load_or_default(config_path.as_deref())?;
    info!("starting monitor: {config:?}");
    let source = Arc::new(SimulatedAdc::start(config.simulation.clone()));
    let control = ControlPanel::new(Arc::clone(&source));
    for command in config.initial_commands() {
        control.apply(command);
    }
    // First tick picks up the converter's real rates.
    control.request_resample();
    let stop = Arc::new(AtomicBool::new(false));
    let ticker = spawn_ticker(
        control.clone(),
        config.initial_rate_hz,
        Arc::clone(&stop),
        config.tick_interval(),
    );
    let (tx, rx) = mpsc::channel();
    spawn_console_reader(tx);
    run_until_done(&control, &rx, &ticker, config.run_duration());
    stop.store(true, Ordering::Release);
    let frames = ticker
        .join()
        .map_err(|_| anyhow!("tick thread panicked"))?
        .context("display tick failed")?;
    write_snapshots(&frames, &config.snapshot_dir)
}
/// Periodic timer driving the scheduler, which lives on this thread with its
/// transform plans. A transform failure ends the thread.
fn spawn_ticker<S: SampleSource + 'static>(
    control: ControlPanel<S>,
    initial_rate_hz: f64,
    stop: Arc<AtomicBool>,
    interval: Duration,
) -> JoinHandle<Result<LatestFrames, DisplayError>> {
    thread::spawn(move || {
        let scheduler = FrameScheduler::new(control, initial_rate_hz)?;
        let mut frames = LatestFrames::new();
        let mut skipped = 0u64;
        while !stop.load(Ordering::Acquire) {
            let started = Instant::now();
            match scheduler.tick(&mut frames) {
                Ok(TickOutcome::Rendered(report)) => debug!("{report:?}"),
                Ok(TickOutcome::Skipped) => skipped += 1,
                Err(err) => {
                    error!("fatal display error: {err}");
                    return Err(err);
                }
            }
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        info!(
            "stopped after {} publishes, {} samples ingested, {skipped} frames skipped",
            frames.publish_count(),
            scheduler.samples_ingested()
        );
        Ok(frames)
    })
}
fn spawn_console_reader(tx: Sender<ConsoleCommand>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match ConsoleCommand::parse(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => warn!("unrecognized command: {line}"),
            }
        }
    });
}
/// Applies console commands until `quit`, the run time elapses, or the ticker stops.
fn run_until_done<S: SampleSource>(
    control: &ControlPanel<S>,
    rx: &Receiver<ConsoleCommand>,
    ticker: &JoinHandle<Result<LatestFrames, DisplayError>>,
    run_for: Option<Duration>,
) {
    let deadline = run_for.map(|d| Instant::now() + d);
    let mut console_open = true;
    loop {
        if ticker.is_finished() {
            return;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("run time elapsed");
            return;
        }
        if !console_open {
            if deadline.is_none() {
                return;
            }
            thread::sleep(COMMAND_POLL);
            continue;
        }
        match rx.recv_timeout(COMMAND_POLL) {
            Ok(ConsoleCommand::Setting(command)) => control.apply(command),
            Ok(ConsoleCommand::Quit) => return,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => console_open = false,
        }
    }
}
fn write_snapshots(frames: &LatestFrames, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let style = PlotStyle::default();
    for frame in frames.frames() {
        let png = render_frame_png(frame, &style)?;
        let name = match frame.channel {
            Channel::First => "channel1.png",
            Channel::Second => "channel2.png",
        };
        let path = dir.join(name);
        fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

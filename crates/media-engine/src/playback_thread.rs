// FILE: crates/media-engine/src/playback_thread.rs

use crate::decoder::AudioDecoder;
use crate::error::{EngineError, EngineResult, TransportError};
use crate::output::AudioOutput;
use crate::speed::SpeedProcessor;
use crate::transport::ErrorSink;
use chapterplay_core::PlaybackSpeed;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;
use tokio::sync::watch;

/// What is known about the length of the active resource
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationState {
    /// The decoder has not opened the resource yet
    Pending,
    Known(f64),
    /// The container does not declare a length, or opening failed
    Unknown,
}

impl DurationState {
    /// Length in seconds; NaN when unknown, zero while pending
    pub fn seconds(self) -> f64 {
        match self {
            Self::Pending => 0.0,
            Self::Known(seconds) => seconds,
            Self::Unknown => f64::NAN,
        }
    }
}

/// Commands sent to the playback thread
#[derive(Debug, Clone)]
pub(crate) enum PlaybackCommand {
    Seek(f64),
    SetSpeed(PlaybackSpeed),
    Stop,
}

/// Per-load wiring between the engine and its playback thread
pub(crate) struct ThreadContext {
    pub generation: u64,
    pub errors: ErrorSink,
    pub duration: watch::Sender<DurationState>,
}

#[derive(Debug)]
struct Shared {
    running: AtomicBool,
    playing: AtomicBool,
    position: AtomicU64,
}

impl Shared {
    fn store_position(&self, seconds: f64) {
        self.position.store(seconds.to_bits(), Ordering::Relaxed);
    }
}

/// Playback thread handle
pub(crate) struct PlaybackThread {
    handle: Option<thread::JoinHandle<()>>,
    command_tx: Sender<PlaybackCommand>,
    shared: Arc<Shared>,
}

impl PlaybackThread {
    /// Starts decoding `path` on a dedicated thread
    ///
    /// Opening the file happens on the thread; failures are reported through
    /// the context's error sink rather than returned here.
    pub fn start(
        path: &Path,
        speed: PlaybackSpeed,
        start_playing: bool,
        ctx: ThreadContext,
    ) -> EngineResult<Self> {
        let path = path.to_path_buf();
        let shared = Arc::new(Shared {
            running: AtomicBool::new(true),
            playing: AtomicBool::new(start_playing),
            position: AtomicU64::new(0f64.to_bits()),
        });
        let (command_tx, command_rx) = bounded(10);

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("chapterplay-playback".to_string())
            .spawn(move || run(path, speed, command_rx, thread_shared, ctx))?;

        Ok(Self {
            handle: Some(handle),
            command_tx,
            shared,
        })
    }

    fn send_command(&self, cmd: PlaybackCommand) -> EngineResult<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| EngineError::InvalidState(format!("Failed to send command: {}", e)))
    }

    /// Moves to `seconds`; the position is visible immediately
    pub fn seek(&self, seconds: f64) -> EngineResult<()> {
        self.shared.store_position(seconds);
        self.send_command(PlaybackCommand::Seek(seconds))
    }

    pub fn set_speed(&self, speed: PlaybackSpeed) -> EngineResult<()> {
        self.send_command(PlaybackCommand::SetSpeed(speed))
    }

    pub fn set_playing(&self, playing: bool) {
        self.shared.playing.store(playing, Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    /// Current playback position in seconds
    pub fn position(&self) -> f64 {
        f64::from_bits(self.shared.position.load(Ordering::Relaxed))
    }

    fn signal_stop(&self) {
        let _ = self.command_tx.try_send(PlaybackCommand::Stop);
        self.shared.running.store(false, Ordering::Relaxed);
    }

    /// Stops the thread and waits for it to exit
    pub fn stop(&mut self) {
        self.signal_stop();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Asks the thread to exit and returns without waiting
    ///
    /// The thread only reports under its own generation, so anything it
    /// emits while winding down is dropped by the sink.
    pub fn detach(mut self) {
        self.signal_stop();
        self.handle.take();
    }
}

impl Drop for PlaybackThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    path: PathBuf,
    speed: PlaybackSpeed,
    command_rx: Receiver<PlaybackCommand>,
    shared: Arc<Shared>,
    ctx: ThreadContext,
) {
    if let Err(e) = playback_loop(&path, speed, &command_rx, &shared, &ctx) {
        log::error!("Playback of {} failed: {}", path.display(), e);
        shared.playing.store(false, Ordering::Relaxed);
        ctx.duration.send_if_modified(|state| {
            if *state == DurationState::Pending {
                *state = DurationState::Unknown;
                true
            } else {
                false
            }
        });
        ctx.errors.report(ctx.generation, TransportError::from(e));
    }
}

/// The main playback loop
fn playback_loop(
    path: &Path,
    speed: PlaybackSpeed,
    command_rx: &Receiver<PlaybackCommand>,
    shared: &Shared,
    ctx: &ThreadContext,
) -> EngineResult<()> {
    let mut decoder = AudioDecoder::new(path)?;
    let spec = *decoder.spec();
    let channels = spec.channels.count().max(1) as u16;

    ctx.duration.send_replace(match decoder.duration() {
        Some(seconds) => DurationState::Known(seconds),
        None => DurationState::Unknown,
    });

    let (audio_tx, audio_rx) = bounded(4);
    let mut output = AudioOutput::new(spec.rate, channels)?;
    let output_running = Arc::new(AtomicBool::new(true));
    output.play(
        audio_rx,
        Arc::clone(&output_running),
        ctx.errors.clone(),
        ctx.generation,
    )?;

    let mut processor = SpeedProcessor::new(channels);
    processor.set_speed(speed);

    let mut current_position = 0.0_f64;
    let mut finished = false;

    while shared.running.load(Ordering::Relaxed) {
        for cmd in command_rx.try_iter() {
            match cmd {
                PlaybackCommand::Seek(time) => match decoder.seek(time) {
                    Ok(()) => {
                        current_position = time;
                        finished = false;
                        shared.store_position(time);
                    }
                    Err(e) => {
                        log::warn!("Seek to {:.2}s failed: {}", time, e);
                        ctx.errors.report(ctx.generation, TransportError::from(e));
                    }
                },
                PlaybackCommand::SetSpeed(speed) => processor.set_speed(speed),
                PlaybackCommand::Stop => return Ok(()),
            }
        }

        if finished || !shared.playing.load(Ordering::Relaxed) {
            thread::sleep(StdDuration::from_millis(10));
            continue;
        }

        match decoder.decode_next()? {
            Some(decoded) => {
                current_position += decoded.seconds();
                let samples = processor.process(&decoded.samples);
                if !feed(&audio_tx, samples, shared) {
                    break;
                }
                shared.store_position(current_position);
            }
            None => {
                // Leave `playing` set so the controller sees the chapter complete
                finished = true;
                let end = decoder.duration().unwrap_or(current_position);
                shared.store_position(end);
                settle_duration(&ctx.duration, end);
                log::info!("Reached end of {}", path.display());
            }
        }
    }

    output.stop();
    Ok(())
}

/// Publishes the decoded length once the end is reached, when the container
/// never declared one
fn settle_duration(duration: &watch::Sender<DurationState>, end: f64) {
    duration.send_if_modified(|state| {
        if *state == DurationState::Unknown {
            *state = DurationState::Known(end);
            true
        } else {
            false
        }
    });
}

/// Hands a buffer to the output, giving up when the thread is stopping
fn feed(audio_tx: &Sender<Vec<f32>>, samples: Vec<f32>, shared: &Shared) -> bool {
    let mut pending = samples;
    loop {
        match audio_tx.send_timeout(pending, StdDuration::from_millis(50)) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(back)) => {
                if !shared.running.load(Ordering::Relaxed) {
                    return false;
                }
                pending = back;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

//! Core media engine for audio playback

use crate::error::EngineResult;
use crate::output::default_output_device_name;
use crate::playback_thread::{DurationState, PlaybackThread, ThreadContext};
use crate::transport::{ErrorSink, Transport, TransportErrors};
use chapterplay_core::PlaybackSpeed;
use parking_lot::Mutex;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

#[derive(Default)]
struct EngineInner {
    thread: Option<PlaybackThread>,
    duration: Option<watch::Receiver<DurationState>>,
    speed: PlaybackSpeed,
    path: Option<PathBuf>,
}

/// Plays one local audio file at a time on the default output device
pub struct MediaEngine {
    errors: ErrorSink,
    inner: Mutex<EngineInner>,
}

impl MediaEngine {
    /// Creates an engine, failing when the host has no output device
    pub fn new() -> EngineResult<Self> {
        let device = default_output_device_name()?;
        log::info!("Using audio output device: {}", device);
        Ok(Self::detached())
    }

    fn detached() -> Self {
        Self {
            errors: ErrorSink::new(),
            inner: Mutex::new(EngineInner::default()),
        }
    }

    /// Path of the resource loaded last, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        self.inner.lock().path.clone()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.inner.lock().speed
    }
}

impl Transport for MediaEngine {
    fn load(&self, path: &Path) {
        let generation = self.errors.advance();
        let mut inner = self.inner.lock();

        // Called from async tasks, so the outgoing thread is not joined here
        if let Some(previous) = inner.thread.take() {
            previous.detach();
        }

        let (duration_tx, duration_rx) = watch::channel(DurationState::Pending);
        inner.duration = Some(duration_rx);
        inner.path = Some(path.to_path_buf());

        let ctx = ThreadContext {
            generation,
            errors: self.errors.clone(),
            duration: duration_tx,
        };

        match PlaybackThread::start(path, inner.speed, true, ctx) {
            Ok(thread) => {
                log::debug!("Loaded {} (generation {})", path.display(), generation);
                inner.thread = Some(thread);
            }
            Err(e) => {
                log::error!("Cannot start playback of {}: {}", path.display(), e);
                self.errors.report(generation, e.into());
            }
        }
    }

    fn play(&self) {
        if let Some(thread) = &self.inner.lock().thread {
            thread.set_playing(true);
        }
    }

    fn pause(&self) {
        if let Some(thread) = &self.inner.lock().thread {
            thread.set_playing(false);
        }
    }

    fn seek(&self, to_seconds: f64) {
        let inner = self.inner.lock();
        let Some(thread) = &inner.thread else {
            return;
        };

        let upper = match inner.duration.as_ref().map(|rx| *rx.borrow()) {
            Some(DurationState::Known(duration)) => duration,
            _ => f64::INFINITY,
        };
        let target = to_seconds.clamp(0.0, upper.max(0.0));

        if let Err(e) = thread.seek(target) {
            log::debug!("Seek ignored: {}", e);
        }
    }

    fn set_speed(&self, speed: PlaybackSpeed) {
        let mut inner = self.inner.lock();
        inner.speed = speed;
        if let Some(thread) = &inner.thread {
            if let Err(e) = thread.set_speed(speed) {
                log::debug!("Speed change deferred to next load: {}", e);
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.inner
            .lock()
            .thread
            .as_ref()
            .is_some_and(|thread| thread.is_playing())
    }

    fn current_position_seconds(&self) -> f64 {
        self.inner
            .lock()
            .thread
            .as_ref()
            .map_or(0.0, |thread| thread.position())
    }

    fn duration_seconds(&self) -> impl Future<Output = f64> + Send {
        let receiver = self.inner.lock().duration.clone();
        async move {
            let Some(mut receiver) = receiver else {
                return 0.0;
            };
            let seconds = match receiver
                .wait_for(|state| *state != DurationState::Pending)
                .await
            {
                Ok(state) => state.seconds(),
                Err(_) => f64::NAN,
            };
            seconds
        }
    }

    fn error_events(&self) -> TransportErrors {
        self.errors.subscribe()
    }
}

// FILE: crates/media-engine/src/transport.rs
//! Transport contract shared by the real engine and test doubles

use crate::error::TransportError;
use chapterplay_core::PlaybackSpeed;
use parking_lot::Mutex;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Wraps a single active audio resource
///
/// All methods take `&self` so one transport can be shared through an `Arc`
/// between the controller and its helper tasks. Failures never surface from
/// the control methods; they are delivered on [`Transport::error_events`].
pub trait Transport: Send + Sync + 'static {
    /// Replaces the active resource and starts playing it from zero
    fn load(&self, path: &Path);

    /// Resumes playback at the current speed
    fn play(&self);

    /// Halts playback
    fn pause(&self);

    /// Moves to an absolute position; no-op when nothing is loaded
    fn seek(&self, to_seconds: f64);

    /// Moves relative to the current position
    fn jump(&self, by_seconds: f64) {
        self.seek(self.current_position_seconds() + by_seconds);
    }

    /// Changes the playback rate
    fn set_speed(&self, speed: PlaybackSpeed);

    fn is_playing(&self) -> bool;

    /// Elapsed time of the active resource, 0 when nothing is loaded
    fn current_position_seconds(&self) -> f64;

    /// Total length of the active resource
    ///
    /// May wait until the resource metadata is available. Returns zero or a
    /// non-finite value when the length is unknown.
    fn duration_seconds(&self) -> impl Future<Output = f64> + Send;

    /// Opens a new error subscription, ending any previous one
    fn error_events(&self) -> TransportErrors;
}

/// One subscription to a transport's error stream
#[derive(Debug)]
pub struct TransportErrors {
    rx: UnboundedReceiver<TransportError>,
}

impl TransportErrors {
    /// Waits for the next error; `None` once the subscription was replaced
    pub async fn recv(&mut self) -> Option<TransportError> {
        self.rx.recv().await
    }

    /// Returns an already delivered error without waiting
    pub fn try_recv(&mut self) -> Option<TransportError> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Default)]
struct SinkInner {
    subscriber: Option<UnboundedSender<TransportError>>,
    generation: u64,
}

/// Routes errors from playback workers to the current subscriber
///
/// Every load advances the generation. Reports carrying an older generation
/// come from a superseded resource and are dropped.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the subscriber and returns the new subscription
    pub fn subscribe(&self) -> TransportErrors {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscriber = Some(tx);
        TransportErrors { rx }
    }

    /// Starts a new generation and returns it
    pub fn advance(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.generation
    }

    /// Delivers an error if it belongs to the current generation
    ///
    /// Returns true when the error reached a subscriber.
    pub fn report(&self, generation: u64, error: TransportError) -> bool {
        let inner = self.inner.lock();
        if generation != inner.generation {
            log::debug!(
                "Dropping error from superseded resource (generation {} != {}): {}",
                generation,
                inner.generation,
                error
            );
            return false;
        }
        Self::deliver(&inner, error)
    }

    /// Delivers an error for the current generation
    pub fn publish(&self, error: TransportError) -> bool {
        let inner = self.inner.lock();
        Self::deliver(&inner, error)
    }

    fn deliver(inner: &SinkInner, error: TransportError) -> bool {
        match &inner.subscriber {
            Some(tx) => tx.send(error).is_ok(),
            None => {
                log::warn!("Playback error with no subscriber: {}", error);
                false
            }
        }
    }
}

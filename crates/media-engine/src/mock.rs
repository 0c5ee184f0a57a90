// FILE: crates/media-engine/src/mock.rs
//! Scriptable transport for exercising controllers without audio hardware

use crate::error::TransportError;
use crate::transport::{ErrorSink, Transport, TransportErrors};
use chapterplay_core::PlaybackSpeed;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Duration reported when a test does not set one
pub const DEFAULT_MOCK_DURATION: f64 = 60.0;

/// One recorded interaction with a [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Load(PathBuf),
    Play,
    Pause,
    Seek(f64),
    Jump(f64),
    SetSpeed(PlaybackSpeed),
}

#[derive(Debug)]
struct MockState {
    loaded: Option<PathBuf>,
    playing: bool,
    position: f64,
    duration: f64,
    durations: HashMap<PathBuf, f64>,
    duration_delays: HashMap<PathBuf, Duration>,
    speed: PlaybackSpeed,
    calls: Vec<TransportCall>,
}

impl MockState {
    fn move_to(&mut self, seconds: f64) {
        if self.loaded.is_none() {
            return;
        }
        let upper = if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            f64::INFINITY
        };
        self.position = seconds.clamp(0.0, upper);
    }
}

/// In-memory transport
///
/// Position only moves through `load`, `seek` and `jump`; tests drive
/// progress explicitly with [`MockTransport::seek`] or
/// [`MockTransport::set_position`].
#[derive(Debug)]
pub struct MockTransport {
    state: Mutex<MockState>,
    errors: ErrorSink,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                loaded: None,
                playing: false,
                position: 0.0,
                duration: DEFAULT_MOCK_DURATION,
                durations: HashMap::new(),
                duration_delays: HashMap::new(),
                speed: PlaybackSpeed::default(),
                calls: Vec::new(),
            }),
            errors: ErrorSink::new(),
        }
    }

    /// Sets the duration of the active resource
    ///
    /// Also becomes the default for resources without their own duration.
    pub fn set_duration(&self, seconds: f64) {
        self.state.lock().duration = seconds;
    }

    /// Gives one resource its own duration, applied when it is loaded
    pub fn set_duration_for(&self, path: impl Into<PathBuf>, seconds: f64) {
        self.state.lock().durations.insert(path.into(), seconds);
    }

    /// Makes `duration_seconds` wait before answering while `path` is active
    pub fn delay_duration_for(&self, path: impl Into<PathBuf>, delay: Duration) {
        self.state.lock().duration_delays.insert(path.into(), delay);
    }

    /// Moves the position without recording a call
    pub fn set_position(&self, seconds: f64) {
        self.state.lock().position = seconds;
    }

    /// Emits an error on the current subscription
    pub fn simulate_error(&self, message: impl Into<String>) {
        self.errors.publish(TransportError::Other(message.into()));
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the recorded calls and clears the log
    pub fn take_calls(&self) -> Vec<TransportCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    pub fn loaded(&self) -> Option<PathBuf> {
        self.state.lock().loaded.clone()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.state.lock().speed
    }
}

impl Transport for MockTransport {
    fn load(&self, path: &Path) {
        self.errors.advance();
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Load(path.to_path_buf()));
        if let Some(&duration) = state.durations.get(path) {
            state.duration = duration;
        }
        state.loaded = Some(path.to_path_buf());
        state.position = 0.0;
        state.playing = true;
    }

    fn play(&self) {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Play);
        state.playing = true;
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Pause);
        state.playing = false;
    }

    fn seek(&self, to_seconds: f64) {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Seek(to_seconds));
        state.move_to(to_seconds);
    }

    fn jump(&self, by_seconds: f64) {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Jump(by_seconds));
        let target = state.position + by_seconds;
        state.move_to(target);
    }

    fn set_speed(&self, speed: PlaybackSpeed) {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::SetSpeed(speed));
        state.speed = speed;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn current_position_seconds(&self) -> f64 {
        self.state.lock().position
    }

    fn duration_seconds(&self) -> impl Future<Output = f64> + Send {
        let (duration, delay) = {
            let state = self.state.lock();
            let delay = state
                .loaded
                .as_ref()
                .and_then(|path| state.duration_delays.get(path).copied());
            (state.duration, delay)
        };
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            duration
        }
    }

    fn error_events(&self) -> TransportErrors {
        self.errors.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults() {
        let mock = MockTransport::new();
        assert!(!mock.is_playing());
        assert_eq!(mock.current_position_seconds(), 0.0);
        assert_eq!(mock.duration_seconds().await, DEFAULT_MOCK_DURATION);
    }

    #[test]
    fn test_load_resets_and_plays() {
        let mock = MockTransport::new();
        mock.load(Path::new("sound1.mp3"));
        mock.seek(20.0);
        mock.load(Path::new("sound2.mp3"));

        assert!(mock.is_playing());
        assert_eq!(mock.current_position_seconds(), 0.0);
        assert_eq!(mock.loaded(), Some(PathBuf::from("sound2.mp3")));
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mock = MockTransport::new();
        mock.load(Path::new("sound1.mp3"));
        mock.set_duration(10.0);

        mock.seek(25.0);
        assert_eq!(mock.current_position_seconds(), 10.0);
        mock.seek(-3.0);
        assert_eq!(mock.current_position_seconds(), 0.0);
    }

    #[test]
    fn test_seek_without_resource_is_noop() {
        let mock = MockTransport::new();
        mock.seek(5.0);
        assert_eq!(mock.current_position_seconds(), 0.0);
        assert_eq!(mock.calls(), vec![TransportCall::Seek(5.0)]);
    }

    #[test]
    fn test_jump_is_relative() {
        let mock = MockTransport::new();
        mock.load(Path::new("sound1.mp3"));
        mock.seek(30.0);
        mock.jump(15.0);
        assert_eq!(mock.current_position_seconds(), 45.0);
        mock.jump(-50.0);
        assert_eq!(mock.current_position_seconds(), 0.0);
    }

    #[tokio::test]
    async fn test_per_path_duration() {
        let mock = MockTransport::new();
        mock.set_duration_for("sound2.mp3", 12.0);

        mock.load(Path::new("sound1.mp3"));
        assert_eq!(mock.duration_seconds().await, DEFAULT_MOCK_DURATION);
        mock.load(Path::new("sound2.mp3"));
        assert_eq!(mock.duration_seconds().await, 12.0);
    }

    #[test]
    fn test_simulated_error_delivered() {
        let mock = MockTransport::new();
        let mut errors = mock.error_events();
        mock.simulate_error("decoder exploded");
        assert_eq!(
            errors.try_recv(),
            Some(TransportError::Other("decoder exploded".to_string()))
        );
    }

    #[test]
    fn test_call_log() {
        let mock = MockTransport::new();
        mock.load(Path::new("a.mp3"));
        mock.pause();
        mock.set_speed(PlaybackSpeed::Half);

        assert_eq!(
            mock.take_calls(),
            vec![
                TransportCall::Load(PathBuf::from("a.mp3")),
                TransportCall::Pause,
                TransportCall::SetSpeed(PlaybackSpeed::Half),
            ]
        );
        assert!(mock.calls().is_empty());
    }
}

//! Behaviour every transport must share, checked against the in-memory one

use media_engine::{MockTransport, Transport, TransportCall, TransportError};
use std::path::Path;

fn relative_jumps<T: Transport>(transport: &T) -> Vec<f64> {
    transport.load(Path::new("sound1.mp3"));
    let mut positions = vec![transport.current_position_seconds()];
    for by in [15.0, 15.0, -20.0, -30.0] {
        transport.jump(by);
        positions.push(transport.current_position_seconds());
    }
    positions
}

#[test]
fn test_jump_moves_relative_and_clamps_at_zero() {
    let mock = MockTransport::new();
    assert_eq!(relative_jumps(&mock), vec![0.0, 15.0, 30.0, 10.0, 0.0]);
}

#[test]
fn test_load_supersedes_playback_state() {
    let mock = MockTransport::new();
    mock.load(Path::new("sound1.mp3"));
    mock.pause();
    mock.seek(42.0);

    mock.load(Path::new("sound2.mp3"));
    assert!(mock.is_playing());
    assert_eq!(mock.current_position_seconds(), 0.0);
}

#[tokio::test]
async fn test_error_stream_follows_latest_subscription() {
    let mock = MockTransport::new();
    let mut stale = mock.error_events();
    let mut current = mock.error_events();

    mock.simulate_error("unsupported codec");

    assert!(stale.recv().await.is_none());
    assert_eq!(
        current.recv().await,
        Some(TransportError::Other("unsupported codec".to_string()))
    );
}

#[tokio::test]
async fn test_duration_is_readable_before_and_after_load() {
    let mock = MockTransport::new();
    mock.set_duration(10.0);
    assert_eq!(mock.duration_seconds().await, 10.0);

    mock.load(Path::new("sound1.mp3"));
    mock.set_duration(f64::NAN);
    assert!(mock.duration_seconds().await.is_nan());
    assert_eq!(mock.calls(), vec![TransportCall::Load("sound1.mp3".into())]);
}

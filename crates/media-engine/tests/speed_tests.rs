//! Speed processing over decoded audio

use media_engine::{AudioDecoder, PlaybackSpeed, SpeedProcessor};
use std::path::Path;
use tempfile::TempDir;

fn write_tone(path: &Path, seconds: u32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..(seconds * sample_rate) {
        let t = i as f32 / sample_rate as f32;
        let sample = ((2.0 * std::f32::consts::PI * 220.0 * t).sin() * 6000.0) as i16;
        writer.write_sample(sample).unwrap();
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn stretched_seconds(path: &Path, speed: PlaybackSpeed, pitch_correction: bool) -> f64 {
    let mut decoder = AudioDecoder::new(path).unwrap();
    let spec = *decoder.spec();
    let channels = spec.channels.count();
    let mut processor = SpeedProcessor::new(channels as u16);
    processor.set_speed(speed);
    processor.set_pitch_correction(pitch_correction);

    let mut frames = 0usize;
    while let Some(decoded) = decoder.decode_next().unwrap() {
        frames += processor.process(&decoded.samples).len() / channels;
    }
    frames as f64 / spec.rate as f64
}

#[test]
fn test_normal_speed_keeps_length() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sound1.wav");
    write_tone(&path, 2, 8000);

    let seconds = stretched_seconds(&path, PlaybackSpeed::Normal, true);
    assert!((seconds - 2.0).abs() < 0.01, "got {}", seconds);
}

#[test]
fn test_every_speed_scales_length() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sound2.wav");
    write_tone(&path, 2, 8000);

    for speed in PlaybackSpeed::ALL {
        let expected = 2.0 / speed.value() as f64;
        let seconds = stretched_seconds(&path, speed, false);
        assert!(
            (seconds - expected).abs() < 0.05 * expected,
            "{}: expected ~{}s, got {}s",
            speed,
            expected,
            seconds
        );
    }
}

#[test]
fn test_speed_change_mid_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sound3.wav");
    write_tone(&path, 1, 8000);

    let mut decoder = AudioDecoder::new(&path).unwrap();
    let mut processor = SpeedProcessor::new(2);
    let mut speeds = PlaybackSpeed::ALL.into_iter().cycle();

    while let Some(decoded) = decoder.decode_next().unwrap() {
        processor.set_speed(speeds.next().unwrap());
        let output = processor.process(&decoded.samples);
        assert_eq!(output.len() % 2, 0);
        assert!(output.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }
}

// FILE: crates/media-engine/src/speed.rs
//! Time-stretching of decoded audio for non-normal playback speeds

use chapterplay_core::PlaybackSpeed;

/// Processes interleaved audio to change playback speed
///
/// With pitch correction, windowed segments are overlap-added at a hop
/// scaled by the speed ratio. Without it, frames are resampled by linear
/// interpolation, which shifts pitch along with tempo.
pub struct SpeedProcessor {
    channels: usize,
    speed: PlaybackSpeed,
    pitch_correction: bool,
    planes: Vec<Vec<f32>>,
}

impl SpeedProcessor {
    /// Creates a new speed processor at normal speed
    pub fn new(channels: u16) -> Self {
        let channels = usize::from(channels.max(1));
        Self {
            channels,
            speed: PlaybackSpeed::default(),
            pitch_correction: true,
            planes: vec![Vec::new(); channels],
        }
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn set_pitch_correction(&mut self, enabled: bool) {
        self.pitch_correction = enabled;
    }

    /// Processes an input buffer and returns the speed-adjusted output
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if input.is_empty() || self.speed.is_normal() {
            return input.to_vec();
        }

        self.deinterleave(input);
        let input_frames = self.planes[0].len();
        let ratio = self.speed.value();
        let output_frames = (input_frames as f32 / ratio) as usize;

        let stretched: Vec<Vec<f32>> = if self.pitch_correction {
            let window_size = 1024.min(input_frames / 4).max(64);
            let window = hann_window(window_size);
            self.planes
                .iter()
                .map(|plane| overlap_add(plane, &window, ratio, output_frames))
                .collect()
        } else {
            self.planes
                .iter()
                .map(|plane| interpolate(plane, ratio, output_frames))
                .collect()
        };

        interleave(&stretched, output_frames)
    }

    fn deinterleave(&mut self, input: &[f32]) {
        self.planes.iter_mut().for_each(|p| p.clear());
        for frame in input.chunks_exact(self.channels) {
            for (plane, &sample) in self.planes.iter_mut().zip(frame) {
                plane.push(sample);
            }
        }
    }
}

/// Creates a Hann window for smooth segment transitions
fn hann_window(size: usize) -> Vec<f32> {
    let denom = (size.max(2) - 1) as f32;
    (0..size)
        .map(|i| {
            let phase = std::f32::consts::PI * i as f32 / denom;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

fn overlap_add(plane: &[f32], window: &[f32], ratio: f32, output_frames: usize) -> Vec<f32> {
    let window_size = window.len();
    let hop_in = ((window_size as f32 * ratio) as usize).max(1);
    let hop_out = window_size;
    let mut output = vec![0.0f32; output_frames];

    let mut in_pos = 0;
    let mut out_pos = 0;
    while in_pos + window_size <= plane.len() && out_pos < output_frames {
        let segment = &plane[in_pos..in_pos + window_size];
        for (i, (&sample, &weight)) in segment.iter().zip(window).enumerate() {
            if let Some(slot) = output.get_mut(out_pos + i) {
                *slot += sample * weight;
            }
        }
        in_pos += hop_in;
        out_pos += hop_out;
    }

    // Overlap-add can exceed full scale
    let peak = output.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    if peak > 1.0 {
        let scale = 1.0 / peak;
        output.iter_mut().for_each(|s| *s *= scale);
    }

    output
}

fn interpolate(plane: &[f32], ratio: f32, output_frames: usize) -> Vec<f32> {
    (0..output_frames)
        .map(|out_frame| {
            let position = out_frame as f32 * ratio;
            let index = position as usize;
            let frac = position - index as f32;
            match (plane.get(index), plane.get(index + 1)) {
                (Some(&s0), Some(&s1)) => s0 + (s1 - s0) * frac,
                (Some(&s0), None) => s0,
                _ => 0.0,
            }
        })
        .collect()
}

fn interleave(planes: &[Vec<f32>], frames: usize) -> Vec<f32> {
    let mut output = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            output.push(plane.get(frame).copied().unwrap_or(0.0));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_tone(frames: usize) -> Vec<f32> {
        let mut input = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let t = i as f32 / 44100.0;
            input.push((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.3);
            input.push((2.0 * std::f32::consts::PI * 880.0 * t).sin() * 0.3);
        }
        input
    }

    #[test]
    fn test_processor_creation() {
        let processor = SpeedProcessor::new(2);
        assert_eq!(processor.speed(), PlaybackSpeed::Normal);
    }

    #[test]
    fn test_normal_speed_is_passthrough() {
        let mut processor = SpeedProcessor::new(2);
        let input: Vec<f32> = (0..100).map(|i| (i as f32) / 100.0).collect();
        assert_eq!(processor.process(&input), input);
    }

    #[test]
    fn test_empty_input() {
        let mut processor = SpeedProcessor::new(2);
        processor.set_speed(PlaybackSpeed::Double);
        assert!(processor.process(&[]).is_empty());
    }

    #[test]
    fn test_double_speed_halves_length() {
        let mut processor = SpeedProcessor::new(2);
        processor.set_speed(PlaybackSpeed::Double);
        processor.set_pitch_correction(false);

        let input = stereo_tone(4410);
        let output = processor.process(&input);

        assert_eq!(output.len() % 2, 0, "Output should be stereo interleaved");
        let ratio = output.len() as f32 / input.len() as f32;
        assert!((ratio - 0.5).abs() < 0.01, "Expected ratio ~0.5, got {}", ratio);
    }

    #[test]
    fn test_half_speed_doubles_length_with_pitch_correction() {
        let mut processor = SpeedProcessor::new(2);
        processor.set_speed(PlaybackSpeed::Half);

        let input = stereo_tone(4410);
        let output = processor.process(&input);

        let ratio = output.len() as f32 / input.len() as f32;
        assert!((ratio - 2.0).abs() < 0.01, "Expected ratio ~2.0, got {}", ratio);
        assert!(output.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_both_channels_keep_content() {
        let mut processor = SpeedProcessor::new(2);
        processor.set_speed(PlaybackSpeed::OneAndHalf);
        processor.set_pitch_correction(false);

        let output = processor.process(&stereo_tone(4410));
        let left_max = output.iter().step_by(2).fold(0.0f32, |a, &s| a.max(s.abs()));
        let right_max = output.iter().skip(1).step_by(2).fold(0.0f32, |a, &s| a.max(s.abs()));

        assert!(left_max > 0.01, "Left channel should have content");
        assert!(right_max > 0.01, "Right channel should have content");
    }

    #[test]
    fn test_hann_window_edges() {
        let window = hann_window(64);
        assert_eq!(window.len(), 64);
        assert!(window[0].abs() < 1e-6);
        assert!(window[63].abs() < 1e-6);
        assert!(window[32] > 0.9);
    }
}

// FILE: crates/media-engine/src/decoder.rs

use crate::error::{EngineError, EngineResult};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

pub struct AudioDecoder {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: SignalSpec,
    duration: Option<f64>,
}

/// Interleaved f32 samples for one decoded packet
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub spec: SignalSpec,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.spec.channels.count() {
            0 => 0,
            channels => self.samples.len() / channels,
        }
    }

    /// Playback time covered by this packet in seconds
    pub fn seconds(&self) -> f64 {
        if self.spec.rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.spec.rate as f64
    }
}

impl AudioDecoder {
    pub fn new(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Err(EngineError::NotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path)
            .map_err(|e| EngineError::DecodeError(format!("Failed to open file: {}", e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| EngineError::DecodeError(format!("Failed to probe format: {}", e)))?;

        let reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| EngineError::DecodeError("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| EngineError::DecodeError(format!("Failed to create decoder: {}", e)))?;

        let spec = SignalSpec::new(
            codec_params.sample_rate.unwrap_or(44100),
            codec_params.channels.unwrap_or_default(),
        );

        let duration = match (codec_params.n_frames, codec_params.sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
            _ => None,
        };

        Ok(Self {
            reader,
            decoder,
            track_id,
            spec,
            duration,
        })
    }

    pub fn decode_next(&mut self) -> EngineResult<Option<DecodedAudio>> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(e) => {
                    return Err(EngineError::DecodeError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Decode error, skipping packet: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(EngineError::DecodeError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let samples = convert_to_f32(decoded);

            return Ok(Some(DecodedAudio { samples, spec }));
        }
    }

    pub fn spec(&self) -> &SignalSpec {
        &self.spec
    }

    /// Track length in seconds, if the container declares it
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn seek(&mut self, time_secs: f64) -> EngineResult<()> {
        let sample_rate = self.spec.rate;
        let timestamp = (time_secs.max(0.0) * sample_rate as f64) as u64;

        self.reader
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts: timestamp,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| EngineError::SeekError(format!("Failed to seek: {}", e)))?;

        self.decoder.reset();

        Ok(())
    }
}

fn convert_to_f32(decoded: AudioBufferRef<'_>) -> Vec<f32> {
    let spec = *decoded.spec();
    let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    sample_buf.copy_interleaved_ref(decoded);
    sample_buf.samples().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sine_wav(path: &Path, seconds: u32, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..(seconds * sample_rate) {
            let t = i as f32 / sample_rate as f32;
            let sample = ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 8000.0) as i16;
            writer.write_sample(sample).unwrap();
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decoder_nonexistent_file() {
        let result = AudioDecoder::new(Path::new("nonexistent.mp3"));
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sound1.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let result = AudioDecoder::new(&path);
        assert!(matches!(result, Err(EngineError::DecodeError(_))));
    }

    #[test]
    fn test_decoder_reports_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 2, 8000);

        let decoder = AudioDecoder::new(&path).unwrap();
        let duration = decoder.duration().unwrap();
        assert!((duration - 2.0).abs() < 0.01, "duration was {}", duration);
        assert_eq!(decoder.spec().rate, 8000);
        assert_eq!(decoder.spec().channels.count(), 2);
    }

    #[test]
    fn test_decode_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 1, 8000);

        let mut decoder = AudioDecoder::new(&path).unwrap();
        let mut total = 0.0;
        while let Some(decoded) = decoder.decode_next().unwrap() {
            assert_eq!(decoded.samples.len() % 2, 0);
            total += decoded.seconds();
        }
        assert!((total - 1.0).abs() < 0.01, "decoded {} seconds", total);
    }

    #[test]
    fn test_seek_then_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 2, 8000);

        let mut decoder = AudioDecoder::new(&path).unwrap();
        decoder.seek(1.0).unwrap();

        let mut remaining = 0.0;
        while let Some(decoded) = decoder.decode_next().unwrap() {
            remaining += decoded.seconds();
        }
        assert!(remaining <= 1.05, "remaining {} seconds", remaining);
    }
}

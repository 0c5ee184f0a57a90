// FILE: crates/media-engine/src/output.rs
// Audio output on the host's default device

use crate::error::{EngineError, EngineResult, TransportError};
use crate::transport::ErrorSink;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use crossbeam_channel::{Receiver, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Returns the name of the default output device, failing when there is none
pub fn default_output_device_name() -> EngineResult<String> {
    let device = default_device()?;
    Ok(device_name(&device))
}

fn default_device() -> EngineResult<Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| EngineError::OutputError("No default output device".to_string()))
}

fn device_name(device: &Device) -> String {
    device.name().unwrap_or_else(|_| "unknown".to_string())
}

/// Streams interleaved f32 buffers to the default output device
pub struct AudioOutput {
    device: Device,
    device_name: String,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl AudioOutput {
    /// Opens the default device at the given format
    pub fn new(sample_rate: u32, channels: u16) -> EngineResult<Self> {
        let device = default_device()?;
        let device_name = device_name(&device);

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            device_name,
            config,
            stream: None,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Starts pulling buffers from `rx`
    ///
    /// Stream failures after start are reported to `errors` under `generation`.
    /// `running` is cleared once the sending side hangs up.
    pub fn play(
        &mut self,
        rx: Receiver<Vec<f32>>,
        running: Arc<AtomicBool>,
        errors: ErrorSink,
        generation: u64,
    ) -> EngineResult<()> {
        let mut buffer = Vec::new();
        let mut position = 0;
        let device_name = self.device_name.clone();

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        while position >= buffer.len() {
                            match rx.try_recv() {
                                Ok(next) => {
                                    buffer = next;
                                    position = 0;
                                }
                                Err(TryRecvError::Empty) => {
                                    *sample = 0.0;
                                    break;
                                }
                                Err(TryRecvError::Disconnected) => {
                                    running.store(false, Ordering::Relaxed);
                                    *sample = 0.0;
                                    break;
                                }
                            }
                        }

                        if position < buffer.len() {
                            *sample = buffer[position];
                            position += 1;
                        }
                    }
                },
                move |err| {
                    log::error!("Audio output error on device '{}': {}", device_name, err);
                    errors.report(generation, TransportError::Output(err.to_string()));
                },
                None,
            )
            .map_err(|e| EngineError::OutputError(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| EngineError::OutputError(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        log::debug!("Audio stream started on device: {}", self.device_name);
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("Audio stream stopped on device: {}", self.device_name);
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Media Engine - audio transport for Chapterplay
//!
//! [`MediaEngine`] decodes local files with symphonia and plays them on the
//! default cpal device. [`MockTransport`] implements the same [`Transport`]
//! contract in memory.

mod decoder;
mod engine;
mod error;
mod mock;
mod output;
pub(crate) mod playback_thread;
mod speed;
mod transport;

pub use decoder::{AudioDecoder, DecodedAudio};
pub use engine::MediaEngine;
pub use error::{EngineError, EngineResult, TransportError};
pub use mock::{MockTransport, TransportCall, DEFAULT_MOCK_DURATION};
pub use output::{default_output_device_name, AudioOutput};
pub use playback_thread::DurationState;
pub use speed::SpeedProcessor;
pub use transport::{ErrorSink, Transport, TransportErrors};
pub use chapterplay_core::PlaybackSpeed;

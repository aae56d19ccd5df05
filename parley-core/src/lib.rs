//! # parley-core
//!
//! Speech-capture and canonical PCM WAV encoding SDK.
//!
//! ## Architecture
//!
//! ```text
//! Microphone → AudioCapture → SPSC RingBuffer → finalize → AudioBuffer
//!    (or WAV file ingestion ────────────────────────────────────┘)
//!                                                   │
//!                                    resample (linear, → 16 kHz)
//!                                                   │
//!                                  interleave + quantize (i16 LE)
//!                                                   │
//!                                    RIFF/WAVE container → WavBlob
//!                                                   │
//!                                   Transport (HTTP multipart POST)
//! ```
//!
//! The audio callback is zero-alloc. All heap work happens on the capture
//! thread and in the batch encode, which runs once per finalized recording.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod encode;
pub mod engine;
pub mod error;
pub mod transport;

// Convenience re-exports for downstream crates
pub use audio::buffer::AudioBuffer;
pub use encode::{encode_wav, PcmFrame, WavBlob, TARGET_SAMPLE_RATE};
pub use engine::events::{RecorderStatus, StatusEvent};
pub use engine::{RecorderConfig, RecorderEngine};
pub use error::ParleyError;
pub use transport::{TranslationReply, TranslationRequest, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

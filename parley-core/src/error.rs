use thiserror::Error;

/// All errors produced by parley-core.
#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("no default input device found")]
    NoDefaultInputDevice,

    #[error("recorder is already running")]
    AlreadyRecording,

    #[error("recorder is not running")]
    NotRecording,

    #[error("capture thread ended without delivering a recording")]
    CaptureLost,

    #[error("channel {channel} has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("audio buffer has no channels")]
    NoChannels,

    #[error("PCM payload of {data_bytes} bytes does not fit the 32-bit WAV header fields")]
    EncodingOverflow { data_bytes: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("WAV decode error: {0}")]
    WavDecode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ParleyError>;

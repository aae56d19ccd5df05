//! Interleaving and 16-bit quantization.
//!
//! Converts a resampled multi-channel float buffer into the single i16
//! sequence a PCM WAV payload stores: channel-major within each frame,
//! time-major across frames. Purely functional — no state survives a call.

use crate::audio::buffer::AudioBuffer;
use crate::error::{ParleyError, Result};

/// An interleaved sequence of signed 16-bit PCM samples.
#[derive(Debug, Clone)]
pub struct PcmFrame {
    samples: Vec<i16>,
    channels: u16,
}

impl PcmFrame {
    pub(crate) fn new(samples: Vec<i16>, channels: u16) -> Self {
        Self { samples, channels }
    }

    /// Interleaved samples: `c0@t0, c1@t0, …, c0@t1, …`.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Channel count the samples are interleaved over.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total sample count across all channels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the frame holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration at `sample_rate` in seconds.
    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / f64::from(self.channels) / f64::from(sample_rate)
    }
}

/// Interleave and quantize a resampled buffer into a [`PcmFrame`].
///
/// # Errors
/// `ParleyError::EncodingOverflow` if the channel count cannot be stored in
/// the WAV header's 16-bit channels field.
pub fn interleave(buffer: &AudioBuffer) -> Result<PcmFrame> {
    let channels = u16::try_from(buffer.channel_count()).map_err(|_| {
        ParleyError::EncodingOverflow {
            data_bytes: buffer.len() as u64 * buffer.channel_count() as u64 * 2,
        }
    })?;

    let mut samples = Vec::with_capacity(buffer.len() * buffer.channel_count());
    for t in 0..buffer.len() {
        for channel in buffer.channels() {
            samples.push(quantize(channel[t]));
        }
    }

    Ok(PcmFrame::new(samples, channels))
}

/// Clamp to [-1.0, 1.0], scale, and truncate toward zero.
///
/// Negative values scale by 32768 and non-negative ones by 32767: scaling
/// +1.0 by 32768 would produce 32768, one past the signed 16-bit maximum.
fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32768.0
    } else {
        clamped * 32767.0
    };
    scaled as i16
}

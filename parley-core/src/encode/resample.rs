//! Whole-buffer sample-rate conversion by per-channel linear interpolation.
//!
//! ## Design
//!
//! Capture devices run at their native rate (commonly 44.1 or 48 kHz); the
//! downstream speech service requires 16 kHz. The finalized recording is
//! converted in a single pass once capture has ended — there is no streaming
//! state, and each channel is converted independently of the others.
//!
//! When source rate == target rate the buffer passes through bit-for-bit.
//! Downstream consumers rely on exact sample values for already-16 kHz
//! input, so the passthrough is a correctness requirement, not an
//! optimization.

use tracing::debug;

use crate::audio::buffer::AudioBuffer;
use crate::error::{ParleyError, Result};

/// Convert `buffer` to `target_rate`, taking ownership of the input.
///
/// The output length per channel is `round(len × target / source)`. An empty
/// input yields an empty output at the target rate — not an error.
///
/// # Errors
/// Returns `ParleyError::InvalidSampleRate` if `target_rate == 0`. The
/// source rate was validated when the buffer was constructed.
pub fn resample(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if target_rate == 0 {
        return Err(ParleyError::InvalidSampleRate(target_rate));
    }

    let source_rate = buffer.sample_rate();
    if source_rate == target_rate {
        // Bit-exact passthrough.
        return Ok(buffer);
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let source_len = buffer.len();
    let new_len = (source_len as f64 * ratio).round() as usize;

    let channels = buffer
        .channels()
        .iter()
        .map(|source| resample_channel(source, ratio, new_len))
        .collect();

    debug!(source_rate, target_rate, source_len, new_len, "resampled buffer");

    AudioBuffer::new(channels, target_rate)
}

/// Linear interpolation of one channel onto `new_len` output positions.
fn resample_channel(source: &[f32], ratio: f64, new_len: usize) -> Vec<f32> {
    if source.is_empty() || new_len == 0 {
        return Vec::new();
    }

    let last = source.len() - 1;
    let mut out = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_index = i as f64 / ratio;
        // Both taps are clamped to the final input sample: length rounding
        // can place the last output position past `last` when upsampling.
        let floor_idx = (src_index.floor() as usize).min(last);
        let ceil_idx = (floor_idx + 1).min(last);
        let t = (src_index - floor_idx as f64) as f32;
        out.push(source[floor_idx] * (1.0 - t) + source[ceil_idx] * t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mono(samples: Vec<f32>, rate: u32) -> AudioBuffer {
        AudioBuffer::new(vec![samples], rate).unwrap()
    }

    #[test]
    fn passthrough_identity_is_bit_exact() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        let buffer = mono(samples.clone(), 16_000);
        let out = resample(buffer, 16_000).unwrap();
        assert_eq!(out.sample_rate(), 16_000);
        assert_eq!(out.channel(0), samples.as_slice());
    }

    #[test]
    fn output_length_is_rounded() {
        // 8 kHz → 16 kHz doubles the length exactly.
        let out = resample(mono(vec![0.0; 8_000], 8_000), 16_000).unwrap();
        assert_eq!(out.len(), 16_000);

        // 44.1 kHz → 16 kHz: round(44_100 × 16/44.1) = 16_000.
        let out = resample(mono(vec![0.0; 44_100], 44_100), 16_000).unwrap();
        assert_eq!(out.len(), 16_000);

        // Fractional case: round(1_000 × 16/48) = round(333.33…) = 333.
        let out = resample(mono(vec![0.0; 1_000], 48_000), 16_000).unwrap();
        assert_eq!(out.len(), 333);

        // Tiny input: round(3 × 16/44.1) = round(1.088…) = 1.
        let out = resample(mono(vec![0.5; 3], 44_100), 16_000).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = resample(mono(vec![], 48_000), 16_000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 16_000);
    }

    #[test]
    fn upsampling_interpolates_midpoints() {
        // [0, 1] at 8 kHz → 4 samples at 16 kHz: positions 0, 0.5, 1, 1.5.
        let out = resample(mono(vec![0.0, 1.0], 8_000), 16_000).unwrap();
        assert_eq!(out.len(), 4);
        assert_abs_diff_eq!(out.channel(0)[0], 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(out.channel(0)[1], 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(out.channel(0)[2], 1.0, epsilon = 1e-7);
        // Position 1.5 lies past the last input sample; both taps clamp to it.
        assert_abs_diff_eq!(out.channel(0)[3], 1.0, epsilon = 1e-7);
    }

    #[test]
    fn channels_are_resampled_independently() {
        let buffer = AudioBuffer::new(
            vec![vec![0.0, 1.0, 0.0, 1.0], vec![1.0, 0.0, 1.0, 0.0]],
            32_000,
        )
        .unwrap();
        let out = resample(buffer, 16_000).unwrap();
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.len(), 2);
        // Downsampling by 2 reads source positions 0 and 2 exactly.
        assert_abs_diff_eq!(out.channel(0)[0], 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(out.channel(0)[1], 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(out.channel(1)[0], 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(out.channel(1)[1], 1.0, epsilon = 1e-7);
    }

    #[test]
    fn zero_target_rate_is_rejected() {
        let err = resample(mono(vec![0.0; 16], 48_000), 0).unwrap_err();
        assert!(matches!(err, ParleyError::InvalidSampleRate(0)));
    }
}

//! Validated multi-channel audio buffer handed from a capture source to the
//! encoding pipeline.
//!
//! `AudioBuffer` is immutable after construction: the constructors validate
//! the channel-length invariant once and the fields stay private, so no
//! downstream stage needs to re-check it.

use crate::error::{ParleyError, Result};

/// A finalized recording: per-channel normalized f32 samples at a source rate.
///
/// Invariants (enforced at construction):
/// - at least one channel,
/// - every channel has the same length,
/// - sample rate is non-zero.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Channel-indexed sample sequences, each in [-1.0, 1.0].
    channels: Vec<Vec<f32>>,
    /// Source sample rate in Hz (e.g. 16000, 44100, 48000).
    sample_rate: u32,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample sequences.
    ///
    /// # Errors
    /// - `ParleyError::InvalidSampleRate` if `sample_rate == 0`.
    /// - `ParleyError::NoChannels` if `channels` is empty.
    /// - `ParleyError::ChannelLengthMismatch` if the channels disagree on length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ParleyError::InvalidSampleRate(sample_rate));
        }
        if channels.is_empty() {
            return Err(ParleyError::NoChannels);
        }

        let expected = channels[0].len();
        for (channel, samples) in channels.iter().enumerate().skip(1) {
            if samples.len() != expected {
                return Err(ParleyError::ChannelLengthMismatch {
                    channel,
                    found: samples.len(),
                    expected,
                });
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a buffer from an interleaved (frame-major) stream, as delivered
    /// by the capture callback: `c0@t0, c1@t0, …, c0@t1, …`.
    ///
    /// A trailing partial frame is dropped. Device callbacks deliver whole
    /// frames, so in practice nothing is lost.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(ParleyError::NoChannels);
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Number of channels (always ≥ 1).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of one channel.
    ///
    /// # Panics
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, channel-indexed.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Per-channel sample count (identical across channels).
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns true if the buffer holds zero frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of the recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_equal_length_channels() {
        let buf = AudioBuffer::new(vec![vec![0.0; 480], vec![0.0; 480]], 48_000).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.len(), 480);
        assert_eq!(buf.sample_rate(), 48_000);
    }

    #[test]
    fn rejects_unequal_channel_lengths() {
        let err = AudioBuffer::new(vec![vec![0.0; 480], vec![0.0; 479]], 48_000).unwrap_err();
        match err {
            ParleyError::ChannelLengthMismatch {
                channel,
                found,
                expected,
            } => {
                assert_eq!(channel, 1);
                assert_eq!(found, 479);
                assert_eq!(expected, 480);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let err = AudioBuffer::new(vec![vec![0.0; 16]], 0).unwrap_err();
        assert!(matches!(err, ParleyError::InvalidSampleRate(0)));
    }

    #[test]
    fn rejects_empty_channel_list() {
        let err = AudioBuffer::new(vec![], 16_000).unwrap_err();
        assert!(matches!(err, ParleyError::NoChannels));
    }

    #[test]
    fn empty_channels_are_valid() {
        let buf = AudioBuffer::new(vec![vec![], vec![]], 16_000).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.duration_secs(), 0.0);
    }

    #[test]
    fn from_interleaved_splits_frame_major_order() {
        // c0@t0, c1@t0, c0@t1, c1@t1, c0@t2, c1@t2
        let interleaved = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buf = AudioBuffer::from_interleaved(&interleaved, 2, 44_100).unwrap();
        assert_eq!(buf.channel(0), &[0.1, 0.3, 0.5]);
        assert_eq!(buf.channel(1), &[0.2, 0.4, 0.6]);
    }

    #[test]
    fn from_interleaved_drops_trailing_partial_frame() {
        let interleaved = [0.1, 0.2, 0.3, 0.4, 0.5];
        let buf = AudioBuffer::from_interleaved(&interleaved, 2, 44_100).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.channel(0), &[0.1, 0.3]);
        assert_eq!(buf.channel(1), &[0.2, 0.4]);
    }

    #[test]
    fn duration_reflects_rate_and_length() {
        let buf = AudioBuffer::new(vec![vec![0.0; 8_000]], 8_000).unwrap();
        assert!((buf.duration_secs() - 1.0).abs() < 1e-12);
    }
}

//! The batch encoding pipeline: resample → interleave/quantize → container.
//!
//! ```text
//! AudioBuffer ──resample──► AudioBuffer @ 16 kHz ──interleave──► PcmFrame ──write_blob──► WavBlob
//! ```
//!
//! One invocation consumes one finalized recording and produces one blob.
//! The stages share no state across calls, so concurrent encodes of
//! independently owned buffers need no synchronization. All fatal
//! conditions surface before any output exists — a malformed blob is never
//! observable.

pub mod pcm;
pub mod resample;
pub mod wav;

pub use pcm::PcmFrame;
pub use wav::WavBlob;

use tracing::debug;

use crate::audio::buffer::AudioBuffer;
use crate::error::Result;

/// Fixed output rate required by the downstream speech service (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Convert a finalized recording into a canonical 16 kHz / 16-bit PCM WAV.
///
/// Takes the buffer by value: the pipeline owns its input for the duration
/// of the call and the intermediate resampled buffer is discarded after
/// interleaving.
///
/// # Errors
/// Propagates `EncodingOverflow` for payloads the 32-bit WAV header cannot
/// describe. Buffer-shape violations are impossible here — `AudioBuffer`
/// validates them at construction.
pub fn encode_wav(buffer: AudioBuffer) -> Result<WavBlob> {
    let source_rate = buffer.sample_rate();
    let resampled = resample::resample(buffer, TARGET_SAMPLE_RATE)?;
    let frame = pcm::interleave(&resampled)?;
    let blob = wav::write_blob(&frame, TARGET_SAMPLE_RATE)?;

    debug!(
        source_rate,
        bytes = blob.len(),
        seconds = blob.duration_secs(),
        "encoded recording"
    );

    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_stage_sequential_and_atomic() {
        let buffer = AudioBuffer::new(vec![vec![0.5; 800], vec![-0.5; 800]], 8_000).unwrap();
        let blob = encode_wav(buffer).unwrap();
        // 800 frames at 8 kHz double to 1_600 at 16 kHz, two channels.
        assert_eq!(blob.len(), wav::HEADER_LEN + 1_600 * 2 * 2);
        assert_eq!(blob.channels(), 2);
        assert_eq!(blob.sample_rate(), TARGET_SAMPLE_RATE);
    }

    #[test]
    fn empty_recording_encodes_to_header_only() {
        let buffer = AudioBuffer::new(vec![vec![]], 48_000).unwrap();
        let blob = encode_wav(buffer).unwrap();
        assert_eq!(blob.len(), wav::HEADER_LEN);
    }
}

//! Canonical RIFF/WAVE container writer.
//!
//! Produces the fixed 44-byte header (RIFF / WAVE / "fmt " / data chunks,
//! all multi-byte fields little-endian) followed by the interleaved i16
//! payload, as one contiguous byte buffer. No extension chunks, no padding.
//!
//! The RIFF size fields are 32-bit; a payload that cannot be described by
//! them fails with `EncodingOverflow` before a single byte is produced —
//! a truncated header is never observable.

use tracing::debug;

use crate::encode::pcm::PcmFrame;
use crate::error::{ParleyError, Result};

/// Size of the canonical RIFF/WAVE/fmt/data header in bytes.
pub const HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: u32 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;

/// A finished WAV byte stream plus the telemetry the caller reports.
#[derive(Debug, Clone)]
pub struct WavBlob {
    bytes: Vec<u8>,
    channels: u16,
    sample_rate: u32,
}

impl WavBlob {
    /// The full container: header followed by payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the blob, yielding the raw bytes for transmission.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total size in bytes (header included).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the blob holds no bytes. A well-formed blob always
    /// carries at least the header, so this is false for pipeline output.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Channel count recorded in the header.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate recorded in the header (Hz).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback duration in seconds: payload frames / sample rate.
    pub fn duration_secs(&self) -> f64 {
        let payload = (self.bytes.len() - HEADER_LEN) as f64;
        payload / f64::from(BYTES_PER_SAMPLE) / f64::from(self.channels) / f64::from(self.sample_rate)
    }
}

/// Serialize a quantized frame into a canonical WAV container.
///
/// # Errors
/// - `ParleyError::InvalidSampleRate` if `sample_rate == 0`.
/// - `ParleyError::EncodingOverflow` if the payload or block alignment does
///   not fit the header's fixed-width fields.
pub fn write_blob(frame: &PcmFrame, sample_rate: u32) -> Result<WavBlob> {
    if sample_rate == 0 {
        return Err(ParleyError::InvalidSampleRate(sample_rate));
    }

    let data_len = data_len_bytes(frame.len())?;
    let channels = frame.channels();
    let block_align =
        u16::try_from(u32::from(channels) * BYTES_PER_SAMPLE).map_err(|_| {
            ParleyError::EncodingOverflow {
                data_bytes: u64::from(data_len),
            }
        })?;
    let byte_rate = sample_rate * u32::from(channels) * BYTES_PER_SAMPLE;

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len as usize);

    // RIFF chunk
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for &sample in frame.samples() {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    debug!(
        bytes = bytes.len(),
        channels, sample_rate, "wrote wav container"
    );

    Ok(WavBlob {
        bytes,
        channels,
        sample_rate,
    })
}

/// Payload size in bytes, checked against the 32-bit RIFF size fields.
///
/// The RIFF chunk size stores `36 + dataLength`, so `dataLength` may not
/// exceed `u32::MAX - 36`.
fn data_len_bytes(sample_count: usize) -> Result<u32> {
    let data_bytes = sample_count as u64 * u64::from(BYTES_PER_SAMPLE);
    if data_bytes > u64::from(u32::MAX) - 36 {
        return Err(ParleyError::EncodingOverflow { data_bytes });
    }
    Ok(data_bytes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_canonical_layout() {
        // Two stereo frames: c0@t0, c1@t0, c0@t1, c1@t1.
        let frame = PcmFrame::new(vec![1i16, -2, 257, -32768], 2);
        let blob = write_blob(&frame, 16_000).unwrap();
        let bytes = blob.as_bytes();

        assert_eq!(bytes.len(), HEADER_LEN + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(bytes[24..28].try_into().unwrap()),
            16_000
        );
        // byteRate = rate × channels × 2
        assert_eq!(
            u32::from_le_bytes(bytes[28..32].try_into().unwrap()),
            64_000
        );
        // blockAlign = channels × 2
        assert_eq!(u16::from_le_bytes(bytes[32..34].try_into().unwrap()), 4);
        assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 8);
    }

    #[test]
    fn payload_samples_are_little_endian_in_order() {
        let frame = PcmFrame::new(vec![0x0102i16, -1], 1);
        let blob = write_blob(&frame, 16_000).unwrap();
        assert_eq!(&blob.as_bytes()[44..], &[0x02, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn empty_frame_produces_header_only_blob() {
        let frame = PcmFrame::new(vec![], 1);
        let blob = write_blob(&frame, 16_000).unwrap();
        assert_eq!(blob.len(), HEADER_LEN);
        assert_eq!(blob.duration_secs(), 0.0);
        assert_eq!(
            u32::from_le_bytes(blob.as_bytes()[40..44].try_into().unwrap()),
            0
        );
    }

    #[test]
    fn duration_reflects_frames_channels_and_rate() {
        let frame = PcmFrame::new(vec![0i16; 32_000], 2);
        let blob = write_blob(&frame, 16_000).unwrap();
        // 32_000 samples over 2 channels = 16_000 frames = 1 s at 16 kHz.
        assert!((blob.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_payload_is_rejected_before_writing() {
        // Largest sample count whose byte length still fits the size fields.
        let max_fitting = ((u64::from(u32::MAX) - 36) / 2) as usize;
        assert!(data_len_bytes(max_fitting).is_ok());

        let err = data_len_bytes(max_fitting + 1).unwrap_err();
        match err {
            ParleyError::EncodingOverflow { data_bytes } => {
                assert_eq!(data_bytes, (max_fitting as u64 + 1) * 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let frame = PcmFrame::new(vec![0i16; 4], 1);
        let err = write_blob(&frame, 0).unwrap_err();
        assert!(matches!(err, ParleyError::InvalidSampleRate(0)));
    }
}

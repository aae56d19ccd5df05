//! WAV file ingestion — the "upload a recording" path.
//!
//! Decodes an on-disk PCM or float WAV of any rate, bit depth, and channel
//! count into a validated [`AudioBuffer`]. The capture device path and this
//! path converge on the same type, so the encoding pipeline never knows
//! where a recording came from.

use std::path::Path;

use crate::audio::buffer::AudioBuffer;
use crate::error::{ParleyError, Result};

/// Read a WAV file into per-channel normalized f32 samples.
///
/// Integer samples are scaled into [-1.0, 1.0]; float files are taken as-is.
///
/// # Errors
/// `ParleyError::WavDecode` if the file is missing, truncated, or not a
/// format hound understands.
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| ParleyError::WavDecode(e.to_string()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(|e| ParleyError::WavDecode(e.to_string())))
            .collect::<Result<Vec<_>>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample <= 16 {
                reader
                    .samples::<i16>()
                    .map(|s| {
                        s.map(|v| v as f32 / 32768.0)
                            .map_err(|e| ParleyError::WavDecode(e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                let max = ((1_i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| {
                        s.map(|v| v as f32 / max)
                            .map_err(|e| ParleyError::WavDecode(e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        }
    };

    AudioBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)
}

//! Re-encode an arbitrary WAV file into the canonical 16 kHz / 16-bit form
//! the speech backend accepts.
//!
//! ```text
//! recode <input.wav> [output.wav]
//! ```

use std::path::Path;

use parley_core::{audio::wav_file, encode_wav};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_core=info,recode=info".parse().unwrap()),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("recode failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or_else(|| "usage: recode <input.wav> [output.wav]".to_string())?;
    let output = args.next().unwrap_or_else(|| "output.wav".to_string());

    let buffer = wav_file::read_wav_file(Path::new(&input)).map_err(|e| e.to_string())?;
    info!(
        input = %input,
        channels = buffer.channel_count(),
        sample_rate = buffer.sample_rate(),
        seconds = format_args!("{:.2}", buffer.duration_secs()),
        "decoded input"
    );

    let blob = encode_wav(buffer).map_err(|e| e.to_string())?;
    std::fs::write(&output, blob.as_bytes()).map_err(|e| e.to_string())?;

    info!(
        output = %output,
        bytes = blob.len(),
        seconds = format_args!("{:.2}", blob.duration_secs()),
        "wrote canonical wav"
    );
    Ok(())
}

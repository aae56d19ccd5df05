//! `RecorderEngine` — capture lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! RecorderEngine::new()
//!     └─► start()             → device open, capture thread accumulating, status = Recording
//!         └─► stop()          → running=false, ring drained, finalized AudioBuffer returned
//!             stop_and_encode() additionally runs the encoding pipeline → WavBlob
//! ```
//!
//! `start()`/`stop()` are idempotent: calling them in the wrong state returns
//! an error rather than panicking.
//!
//! ## Threading
//!
//! `cpal::Stream` is `!Send` on Windows/macOS (COM / CoreAudio thread
//! affinity). `AudioCapture` is therefore created *inside* `spawn_blocking`
//! so it never crosses a thread boundary. A sync channel propagates any
//! open-device errors back to the `start()` caller; the finalized recording
//! crosses back to `stop()` by value over a bounded crossbeam channel, so no
//! shared mutable recording state outlives the capture thread.

pub mod events;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    audio::{buffer::AudioBuffer, AudioCapture},
    buffering::{create_audio_ring, AudioConsumer, Consumer},
    encode::{self, WavBlob},
    error::{ParleyError, Result},
};

use events::{RecorderStatus, StatusEvent};

/// Broadcast channel capacity for status events.
const BROADCAST_CAP: usize = 64;

/// Samples drained from the ring per iteration — 20 ms of mono at 48 kHz.
const DRAIN_CHUNK: usize = 960;

/// Sleep when the ring is empty (avoids busy-wait burning a core).
const SLEEP_EMPTY_MS: u64 = 5;

/// How long `stop()` waits for the capture thread to deliver the recording.
const FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for `RecorderEngine`.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Preferred input device name. `None` selects the system default.
    pub preferred_input_device: Option<String>,
    /// Hard cap on accumulated interleaved samples; a recording that reaches
    /// it is truncated rather than growing without bound. Default:
    /// 57 600 000 (10 min of stereo at 48 kHz).
    pub max_capture_samples: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            preferred_input_device: None,
            max_capture_samples: 48_000 * 2 * 60 * 10,
        }
    }
}

/// The top-level recorder handle.
///
/// `RecorderEngine` is `Send + Sync` — all fields use interior mutability.
/// Wrap in `Arc<RecorderEngine>` to share between app state and
/// event-forwarding async tasks.
pub struct RecorderEngine {
    config: RecorderConfig,
    /// `true` while capture is active.
    running: Arc<AtomicBool>,
    /// Canonical status (written via Mutex, read from commands).
    status: Arc<Mutex<RecorderStatus>>,
    /// Broadcast sender for status events.
    status_tx: broadcast::Sender<StatusEvent>,
    /// Receiver for the active session's finalized recording.
    finalize_rx: Mutex<Option<Receiver<Result<AudioBuffer>>>>,
}

impl RecorderEngine {
    /// Create a new engine. Does not open any device — call `start()`.
    pub fn new(config: RecorderConfig) -> Self {
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);

        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(RecorderStatus::Idle)),
            status_tx,
            finalize_rx: Mutex::new(None),
        }
    }

    /// Open the input device and start accumulating audio.
    ///
    /// Blocks until the device is confirmed open (or fails), then returns.
    /// Capture continues on a background blocking thread until `stop()`.
    ///
    /// # Errors
    /// - `ParleyError::AlreadyRecording` if already started.
    /// - `ParleyError::NoDefaultInputDevice` / `ParleyError::AudioStream` on
    ///   device errors.
    pub fn start(&self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(ParleyError::AlreadyRecording);
        }

        self.running.store(true, Ordering::SeqCst);

        let (producer, consumer) = create_audio_ring();
        let (finalize_tx, finalize_rx) = bounded::<Result<AudioBuffer>>(1);
        *self.finalize_rx.lock() = Some(finalize_rx);

        let running = Arc::clone(&self.running);
        let preferred = self.config.preferred_input_device.clone();
        let max_samples = self.config.max_capture_samples;

        // Sync channel: capture thread signals open success/failure to start().
        // Carries the negotiated sample rate and channel count on success.
        let (open_tx, open_rx) = std::sync::mpsc::channel::<Result<(u32, u16)>>();

        tokio::task::spawn_blocking(move || {
            // Open the device on THIS thread — cpal::Stream is !Send.
            let capture = match AudioCapture::open_with_preference(
                producer,
                Arc::clone(&running),
                preferred.as_deref(),
            ) {
                Ok(c) => {
                    let _ = open_tx.send(Ok((c.sample_rate, c.channels)));
                    c
                }
                Err(e) => {
                    let _ = open_tx.send(Err(e));
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let sample_rate = capture.sample_rate;
            let channels = capture.channels;

            let interleaved = accumulate(consumer, &running, max_samples);

            // Stream drops here, releasing the audio device on this thread.
            capture.stop();
            drop(capture);

            let _ = finalize_tx.send(AudioBuffer::from_interleaved(
                &interleaved,
                usize::from(channels),
                sample_rate,
            ));
        });

        match open_rx.recv() {
            Ok(Ok((sample_rate, channels))) => {
                info!(sample_rate, channels, "recording started");
                self.set_status(RecorderStatus::Recording, None);
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                self.set_status(RecorderStatus::Error, Some(e.to_string()));
                Err(e)
            }
            Err(_) => {
                // Channel closed before a message was sent — capture task died.
                self.running.store(false, Ordering::SeqCst);
                self.set_status(RecorderStatus::Error, Some("capture failed to start".into()));
                Err(ParleyError::CaptureLost)
            }
        }
    }

    /// Stop capture and return the finalized recording.
    ///
    /// # Errors
    /// - `ParleyError::NotRecording` if not currently running.
    /// - `ParleyError::CaptureLost` if the capture thread dies without
    ///   delivering a buffer.
    pub fn stop(&self) -> Result<AudioBuffer> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(ParleyError::NotRecording);
        }

        self.running.store(false, Ordering::SeqCst);
        self.set_status(RecorderStatus::Finalizing, None);

        let rx = match self.finalize_rx.lock().take() {
            Some(rx) => rx,
            None => {
                self.set_status(RecorderStatus::Error, Some("no active capture session".into()));
                return Err(ParleyError::CaptureLost);
            }
        };

        match rx.recv_timeout(FINALIZE_TIMEOUT) {
            Ok(Ok(buffer)) => {
                info!(
                    frames = buffer.len(),
                    channels = buffer.channel_count(),
                    sample_rate = buffer.sample_rate(),
                    "recording finalized"
                );
                self.set_status(RecorderStatus::Stopped, None);
                Ok(buffer)
            }
            Ok(Err(e)) => {
                self.set_status(RecorderStatus::Error, Some(e.to_string()));
                Err(e)
            }
            Err(_) => {
                self.set_status(
                    RecorderStatus::Error,
                    Some("capture thread did not finalize in time".into()),
                );
                Err(ParleyError::CaptureLost)
            }
        }
    }

    /// Stop capture and run the finalized recording through the encoding
    /// pipeline. Returns the canonical 16 kHz / 16-bit WAV blob.
    pub fn stop_and_encode(&self) -> Result<WavBlob> {
        let buffer = self.stop()?;

        match encode::encode_wav(buffer) {
            Ok(blob) => {
                info!(
                    bytes = blob.len(),
                    seconds = blob.duration_secs(),
                    "recording encoded"
                );
                Ok(blob)
            }
            Err(e) => {
                self.set_status(RecorderStatus::Error, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Current engine status (snapshot).
    pub fn status(&self) -> RecorderStatus {
        *self.status.lock()
    }

    /// Subscribe to live status change events.
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusEvent> {
        self.status_tx.subscribe()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn set_status(&self, new_status: RecorderStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.status_tx.send(StatusEvent {
            status: new_status,
            detail,
        });
    }
}

/// Drain the ring into an accumulation buffer until `running` clears, then
/// collect whatever the callback pushed before it observed the stop flag.
///
/// Returns interleaved samples at the device channel count, truncated at
/// `max_samples`.
fn accumulate(mut consumer: AudioConsumer, running: &AtomicBool, max_samples: usize) -> Vec<f32> {
    let mut scratch = vec![0f32; DRAIN_CHUNK];
    let mut acc: Vec<f32> = Vec::new();

    while running.load(Ordering::Relaxed) {
        let n = consumer.pop_slice(&mut scratch);
        if n == 0 {
            std::thread::sleep(Duration::from_millis(SLEEP_EMPTY_MS));
            continue;
        }

        let take = n.min(max_samples - acc.len());
        acc.extend_from_slice(&scratch[..take]);

        if take < n {
            warn!(max_samples, "capture cap reached — truncating recording");
            break;
        }
    }

    // Final drain after the stop flag flips.
    loop {
        let n = consumer.pop_slice(&mut scratch);
        if n == 0 {
            break;
        }
        let take = n.min(max_samples - acc.len());
        acc.extend_from_slice(&scratch[..take]);
        if take < n {
            warn!(max_samples, "capture cap reached — truncating recording");
            break;
        }
    }

    acc
}

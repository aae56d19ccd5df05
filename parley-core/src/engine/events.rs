//! Status events broadcast to the embedding application.
//!
//! Field names serialize camelCase and status values lowercase so UI
//! bindings in other languages can consume the events without renaming.

use serde::{Deserialize, Serialize};

/// Emitted whenever the recorder's lifecycle state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub status: RecorderStatus,
    /// Optional human-readable detail (e.g. error message).
    pub detail: Option<String>,
}

/// Current state of the recorder engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderStatus {
    /// Engine created but `start()` not yet called.
    Idle,
    /// Actively capturing audio into the accumulation buffer.
    Recording,
    /// Stop requested — draining the ring and de-interleaving.
    Finalizing,
    /// Recording finalized; engine may be restarted.
    Stopped,
    /// Device or finalization failure — restart required.
    Error,
}

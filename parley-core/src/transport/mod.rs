//! Transport boundary to the downstream speech service.
//!
//! The engine hands a finished [`WavBlob`] to a `Transport` as an opaque
//! payload; the service's request/response envelope lives here, outside the
//! encoding core. `HttpTransport` speaks the backend's multipart form
//! protocol: an `audio` file part plus `src_lang` / `target_lang` text
//! parts, answered with a JSON envelope.

use serde::{Deserialize, Serialize};

use crate::encode::WavBlob;
use crate::error::Result;

#[cfg(feature = "http")]
use crate::error::ParleyError;
#[cfg(feature = "http")]
use tracing::debug;

/// Language pair accompanying an uploaded recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language code (e.g. `"eng"`).
    pub source_lang: String,
    /// Target language code (e.g. `"hin"`).
    pub target_lang: String,
}

/// Reply envelope from the speech service.
///
/// Every field is optional — the backend omits whatever a given endpoint
/// does not produce, and older deployments use a subset of these keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationReply {
    #[serde(default)]
    pub transcribed_text: Option<String>,
    #[serde(default)]
    pub translated_text: Option<String>,
    /// Name of the synthesized audio file the server exposes for download.
    #[serde(default)]
    pub audio_file: Option<String>,
    /// Duration of the synthesized audio in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Size of the synthesized audio in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Server-side failure description; mapped to `ParleyError::Transport`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Contract for shipping one encoded recording to the speech service.
///
/// Implementations block until the service replies; call from a blocking
/// context (`spawn_blocking` in async apps).
pub trait Transport: Send + Sync {
    fn send_recording(
        &self,
        blob: &WavBlob,
        request: &TranslationRequest,
    ) -> Result<TranslationReply>;
}

/// HTTP multipart implementation of [`Transport`].
#[cfg(feature = "http")]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a transport posting to `endpoint`
    /// (e.g. `http://localhost:5000/speech-to-speech`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn send_recording(
        &self,
        blob: &WavBlob,
        request: &TranslationRequest,
    ) -> Result<TranslationReply> {
        let part = reqwest::blocking::multipart::Part::bytes(blob.as_bytes().to_vec())
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| ParleyError::Transport(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new()
            .part("audio", part)
            .text("src_lang", request.source_lang.clone())
            .text("target_lang", request.target_lang.clone());

        debug!(
            endpoint = %self.endpoint,
            bytes = blob.len(),
            source_lang = %request.source_lang,
            target_lang = %request.target_lang,
            "posting recording"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| ParleyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParleyError::Transport(format!("server returned {status}")));
        }

        let reply: TranslationReply = response
            .json()
            .map_err(|e| ParleyError::Transport(e.to_string()))?;

        if let Some(error) = &reply.error {
            return Err(ParleyError::Transport(error.clone()));
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_envelope_deserializes_full_payload() {
        let json = r#"{
            "audio_file": "output.wav",
            "duration": 2.75,
            "file_size": 88244,
            "transcribed_text": "hello world",
            "translated_text": "नमस्ते दुनिया"
        }"#;

        let reply: TranslationReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.audio_file.as_deref(), Some("output.wav"));
        assert_eq!(reply.duration, Some(2.75));
        assert_eq!(reply.file_size, Some(88_244));
        assert_eq!(reply.transcribed_text.as_deref(), Some("hello world"));
        assert!(reply.error.is_none());
    }

    #[test]
    fn reply_envelope_tolerates_sparse_payloads() {
        let reply: TranslationReply = serde_json::from_str(r#"{"translated_text": "hola"}"#).unwrap();
        assert_eq!(reply.translated_text.as_deref(), Some("hola"));
        assert!(reply.audio_file.is_none());
        assert!(reply.duration.is_none());
    }

    #[test]
    fn error_payload_carries_server_message() {
        let reply: TranslationReply =
            serde_json::from_str(r#"{"error": "Missing 'target_lang'"}"#).unwrap();
        assert_eq!(reply.error.as_deref(), Some("Missing 'target_lang'"));
    }
}

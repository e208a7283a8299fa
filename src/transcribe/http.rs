// src/transcribe/http.rs
// HTTP speech-to-text backend (OpenAI-compatible transcription endpoint)

use super::types::TranscribeError;
use super::SpeechBackend;
use async_trait::async_trait;
use reqwest::multipart;

const RESPONSE_FORMAT: &str = "text";

/// Speech backend over an OpenAI-style `audio/transcriptions` endpoint.
///
/// Any non-success status is a uniform segment failure; no status-specific
/// handling and no retries. No request timeout either: a long segment is
/// allowed to be slow, and callers needing bounded latency wrap the whole
/// run.
pub struct HttpSpeechBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpSpeechBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechBackend for HttpSpeechBackend {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String, TranscribeError> {
        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| TranscribeError::Network(e.to_string()))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", RESPONSE_FORMAT)
            .part("file", file_part);

        tracing::debug!(endpoint = %self.endpoint, file = file_name, "Sending segment to speech backend");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscribeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscribeError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TranscribeError::Network(e.to_string()))?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "http"
    }
}

// src/transcribe/mod.rs
// Transcription strategies and collaborator contracts

mod http;
mod local;
mod remote;
mod runtime;
mod types;
#[cfg(feature = "whisper-local")]
mod whisper;

pub use http::HttpSpeechBackend;
pub use local::{LocalSequentialTranscriber, RuntimeLoader};
pub use remote::{RemoteBatchTranscriber, DEFAULT_MAX_CONCURRENT_REQUESTS};
pub use runtime::{
    InferenceOptions, InferenceOutput, InferenceRuntime, InferenceTask, TimedChunk,
    TARGET_SAMPLE_RATE,
};
pub use types::{error_placeholder, TranscribeError, TranscriptionProgress, TranscriptionResult};
#[cfg(feature = "whisper-local")]
pub use whisper::WhisperRuntime;

use crate::session::AudioSegment;
use async_trait::async_trait;

/// Polymorphic contract both execution strategies implement.
///
/// For an input of N segments the output always holds exactly N results,
/// sorted ascending by segment index, independent of execution order or
/// partial failure. An empty input yields an empty output and no progress
/// calls. Per-segment failures are encoded as placeholder results; only
/// whole-run conditions reject the call.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe_segments(
        &self,
        segments: &[AudioSegment],
        on_progress: Option<&(dyn Fn(TranscriptionProgress) + Send + Sync)>,
    ) -> Result<Vec<TranscriptionResult>, TranscribeError>;
}

/// Remote speech-to-text backend: one encoded payload plus a filename hint
/// in, transcript text out.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String, TranscribeError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

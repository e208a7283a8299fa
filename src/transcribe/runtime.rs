// src/transcribe/runtime.rs
// Local inference runtime contract

use super::types::TranscribeError;

/// Sample rate the inference runtime requires its input at.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Per-invocation options.
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Language hint; `None` means automatic detection.
    pub language: Option<String>,
    pub task: InferenceTask,
    /// Window length for runtimes that chunk internally; runtimes with a
    /// fixed native window may ignore it.
    pub chunk_length_secs: u32,
    /// Emit chunk timestamps.
    pub timestamps: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            language: None,
            task: InferenceTask::Transcribe,
            chunk_length_secs: 30,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceTask {
    Transcribe,
    Translate,
}

/// A timed slice of recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedChunk {
    pub text: String,
    pub start: Option<f32>,
    pub end: Option<f32>,
}

/// Every result shape a runtime may hand back, decoded once at this
/// boundary. Downstream code only ever sees the joined text.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutput {
    /// Bare transcript string.
    Raw(String),
    /// Object-shaped result with a flat text field.
    Text { text: String },
    /// Sequence of timed chunks; texts are joined with single spaces.
    Chunks { chunks: Vec<TimedChunk> },
}

impl InferenceOutput {
    pub fn into_text(self) -> String {
        match self {
            InferenceOutput::Raw(text) => text.trim().to_string(),
            InferenceOutput::Text { text } => text.trim().to_string(),
            InferenceOutput::Chunks { chunks } => chunks
                .iter()
                .map(|chunk| chunk.text.trim())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// On-device speech-to-text model: loaded once, then invoked synchronously
/// per segment with a mono waveform at [`TARGET_SAMPLE_RATE`]. Inference is
/// read-only, so a loaded runtime needs no mutual exclusion.
pub trait InferenceRuntime: Send + Sync {
    fn transcribe(
        &self,
        samples: &[f32],
        sample_rate: u32,
        options: &InferenceOptions,
    ) -> Result<InferenceOutput, TranscribeError>;
}

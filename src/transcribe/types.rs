// src/transcribe/types.rs
// Transcription contract types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::DecodeError;

/// One transcription per input segment; never dropped, even on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptionResult {
    /// Transcribed text, or the error placeholder for a failed segment.
    pub transcription: String,
    /// Index of the segment this text belongs to.
    pub segment_index: u32,
}

/// Pushed after logically complete units of work (a batch, or a segment).
/// `completed` is monotonically non-decreasing; `total` is fixed for a run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TranscriptionProgress {
    pub completed: usize,
    pub total: usize,
    pub current_segment: Option<u32>,
}

/// Visible substitute text for a segment that failed to transcribe.
pub fn error_placeholder(segment_index: u32) -> String {
    format!("[Error transcribing segment {}]", segment_index)
}

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("inference runtime failed to load: {0}")]
    ModelLoad(String),
}

impl TranscribeError {
    /// Whole-run failures reject the `transcribe_segments` call; everything
    /// else degrades a single segment to its placeholder.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TranscribeError::ModelLoad(_))
    }
}

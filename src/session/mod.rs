use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::media::MediaConverter;
use crate::transcribe::{
    TranscribeError, TranscriptionProgress, TranscriptionResult, TranscriptionService,
};

pub mod segment;
pub mod splitter;
pub mod stitcher;

pub use segment::AudioSegment;
pub use splitter::{AudioSplitter, SplitError, DEFAULT_SLICE_DURATION_SECS};
pub use stitcher::assemble_transcript;

/// Drives one full run: split the source, transcribe every segment with the
/// selected strategy, assemble the ordered transcript.
///
/// A run is atomic from the caller's point of view: it resolves with full
/// (possibly degraded) results, or fails as a whole. No cancellation
/// mid-run; callers needing bounded latency put a timeout around `run`.
pub struct TranscriptionSession {
    splitter: AudioSplitter,
    service: Arc<dyn TranscriptionService>,
}

#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Final transcript, segments separated by a blank line, in index order.
    pub transcript: String,
    pub results: Vec<TranscriptionResult>,
    /// Input segments with their transcriptions bound.
    pub segments: Vec<AudioSegment>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Transcribe(#[from] TranscribeError),
}

impl TranscriptionSession {
    pub fn new(service: Arc<dyn TranscriptionService>) -> Self {
        Self {
            splitter: AudioSplitter::new(),
            service,
        }
    }

    pub fn with_splitter(service: Arc<dyn TranscriptionService>, splitter: AudioSplitter) -> Self {
        Self { splitter, service }
    }

    pub async fn run(
        &self,
        converter: &dyn MediaConverter,
        source_name: &str,
        on_progress: Option<&(dyn Fn(TranscriptionProgress) + Send + Sync)>,
    ) -> Result<SessionResult, SessionError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, source = source_name, "Starting transcription run");

        let mut segments = self.splitter.split(converter, source_name)?;
        let results = self
            .service
            .transcribe_segments(&segments, on_progress)
            .await?;

        // Both sequences are in index order with matching lengths.
        for (segment, result) in segments.iter_mut().zip(&results) {
            segment.set_transcription(result.transcription.clone());
        }

        let transcript = assemble_transcript(&results);

        tracing::info!(
            %run_id,
            segments = segments.len(),
            chars = transcript.len(),
            "Transcription run finished"
        );

        Ok(SessionResult {
            transcript,
            results,
            segments,
        })
    }
}

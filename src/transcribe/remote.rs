// src/transcribe/remote.rs
// Remote batch execution strategy

use super::types::{error_placeholder, TranscribeError, TranscriptionProgress, TranscriptionResult};
use super::{SpeechBackend, TranscriptionService};
use crate::session::AudioSegment;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Transcribes segments against a remote backend in contiguous batches of at
/// most `max_concurrent_requests` concurrent calls.
///
/// A batch runs to completion before the next one starts. That caps peak
/// concurrency exactly at the configured bound and keeps progress at a fixed
/// per-batch granularity; a continuously refilled pool would finish slightly
/// sooner, but remote latency dominates either way. A failed call never
/// aborts its batch or later batches: the segment gets its placeholder text
/// and the run carries on.
pub struct RemoteBatchTranscriber {
    backend: Arc<dyn SpeechBackend>,
    max_concurrent_requests: usize,
}

impl RemoteBatchTranscriber {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self::with_concurrency(backend, DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    pub fn with_concurrency(backend: Arc<dyn SpeechBackend>, max_concurrent_requests: usize) -> Self {
        Self {
            backend,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }
}

#[async_trait]
impl TranscriptionService for RemoteBatchTranscriber {
    async fn transcribe_segments(
        &self,
        segments: &[AudioSegment],
        on_progress: Option<&(dyn Fn(TranscriptionProgress) + Send + Sync)>,
    ) -> Result<Vec<TranscriptionResult>, TranscribeError> {
        let total = segments.len();
        let mut results: Vec<TranscriptionResult> = Vec::with_capacity(total);
        let mut failures: Vec<(u32, TranscribeError)> = Vec::new();
        let mut processed = 0usize;

        for batch in segments.chunks(self.max_concurrent_requests) {
            // Each call owns its result slot; the barrier below is the only
            // synchronization.
            let calls = batch.iter().map(|segment| async move {
                match self
                    .backend
                    .transcribe(&segment.buffer, &segment.file_name)
                    .await
                {
                    Ok(text) => (
                        TranscriptionResult {
                            transcription: text,
                            segment_index: segment.index,
                        },
                        None,
                    ),
                    Err(e) => (
                        TranscriptionResult {
                            transcription: error_placeholder(segment.index),
                            segment_index: segment.index,
                        },
                        Some((segment.index, e)),
                    ),
                }
            });

            for (result, failure) in join_all(calls).await {
                results.push(result);
                if let Some(failure) = failure {
                    failures.push(failure);
                }
            }

            processed += batch.len();
            if let Some(on_progress) = on_progress {
                on_progress(TranscriptionProgress {
                    completed: processed.min(total),
                    total,
                    current_segment: batch.last().map(|segment| segment.index),
                });
            }
        }

        if !failures.is_empty() {
            let indices: Vec<u32> = failures.iter().map(|(index, _)| *index).collect();
            tracing::warn!(
                backend = self.backend.name(),
                failed = failures.len(),
                segments = ?indices,
                "Transcription completed with errors"
            );
            for (index, error) in &failures {
                tracing::debug!(segment = index, error = %error, "Segment failure detail");
            }
        }

        results.sort_by_key(|result| result.segment_index);
        Ok(results)
    }
}

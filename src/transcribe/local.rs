// src/transcribe/local.rs
// Local sequential execution strategy

use super::runtime::{InferenceOptions, InferenceRuntime, TARGET_SAMPLE_RATE};
use super::types::{error_placeholder, TranscribeError, TranscriptionProgress, TranscriptionResult};
use super::TranscriptionService;
use crate::audio;
use crate::session::AudioSegment;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds the inference runtime; invoked at most once per transcriber
/// instance, on first use.
pub type RuntimeLoader =
    Box<dyn Fn() -> Result<Arc<dyn InferenceRuntime>, TranscribeError> + Send + Sync>;

/// Runs inference fully locally, one segment at a time.
///
/// The runtime is not assumed thread-safe or parallel-capable, so segments
/// are processed strictly sequentially. The loaded handle is owned by this
/// instance and reused for every call; the cold start is paid once, on the
/// first segment. A load failure is the one whole-run fatal condition — an
/// inference or decode failure only degrades its own segment.
pub struct LocalSequentialTranscriber {
    loader: RuntimeLoader,
    runtime: OnceCell<Arc<dyn InferenceRuntime>>,
    options: InferenceOptions,
}

impl LocalSequentialTranscriber {
    pub fn new(loader: RuntimeLoader) -> Self {
        Self::with_options(loader, InferenceOptions::default())
    }

    pub fn with_options(loader: RuntimeLoader, options: InferenceOptions) -> Self {
        Self {
            loader,
            runtime: OnceCell::new(),
            options,
        }
    }

    /// Transcriber backed by a whisper.cpp model file.
    #[cfg(feature = "whisper-local")]
    pub fn from_model_path(model_path: std::path::PathBuf, options: InferenceOptions) -> Self {
        Self::with_options(
            Box::new(move || {
                let runtime = super::whisper::WhisperRuntime::new(&model_path)?;
                Ok(Arc::new(runtime) as Arc<dyn InferenceRuntime>)
            }),
            options,
        )
    }

    async fn runtime(&self) -> Result<Arc<dyn InferenceRuntime>, TranscribeError> {
        let runtime = self
            .runtime
            .get_or_try_init(|| async { (self.loader)() })
            .await?;
        Ok(Arc::clone(runtime))
    }

    async fn transcribe_segment(
        &self,
        runtime: &Arc<dyn InferenceRuntime>,
        segment: &AudioSegment,
    ) -> Result<String, TranscribeError> {
        let waveform = audio::decode_bytes(&segment.buffer)?.into_rate(TARGET_SAMPLE_RATE);

        // Inference is synchronous and potentially long; keep it off the
        // async workers.
        let runtime = Arc::clone(runtime);
        let options = self.options.clone();
        let output = tokio::task::spawn_blocking(move || {
            runtime.transcribe(&waveform.samples, waveform.sample_rate, &options)
        })
        .await
        .map_err(|e| TranscribeError::Inference(format!("inference task aborted: {}", e)))??;

        Ok(output.into_text())
    }
}

#[async_trait]
impl TranscriptionService for LocalSequentialTranscriber {
    async fn transcribe_segments(
        &self,
        segments: &[AudioSegment],
        on_progress: Option<&(dyn Fn(TranscriptionProgress) + Send + Sync)>,
    ) -> Result<Vec<TranscriptionResult>, TranscribeError> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        let runtime = self.runtime().await?;

        let total = segments.len();
        let mut results = Vec::with_capacity(total);

        for (i, segment) in segments.iter().enumerate() {
            match self.transcribe_segment(&runtime, segment).await {
                Ok(text) => {
                    results.push(TranscriptionResult {
                        transcription: text,
                        segment_index: segment.index,
                    });
                }
                Err(e) => {
                    tracing::error!(segment = segment.index, error = %e, "Failed to transcribe segment");
                    results.push(TranscriptionResult {
                        transcription: error_placeholder(segment.index),
                        segment_index: segment.index,
                    });
                }
            }

            if let Some(on_progress) = on_progress {
                on_progress(TranscriptionProgress {
                    completed: i + 1,
                    total,
                    current_segment: Some(segment.index),
                });
            }
        }

        // Sequential processing already yields index order; the sort keeps
        // the contract symmetric with the batch strategy.
        results.sort_by_key(|result| result.segment_index);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav;
    use crate::transcribe::runtime::{InferenceOutput, TimedChunk};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedRuntime {
        outputs: Mutex<VecDeque<Result<InferenceOutput, TranscribeError>>>,
        seen_rates: Mutex<Vec<u32>>,
        seen_lens: Mutex<Vec<usize>>,
    }

    impl ScriptedRuntime {
        fn new(outputs: Vec<Result<InferenceOutput, TranscribeError>>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into()),
                seen_rates: Mutex::new(Vec::new()),
                seen_lens: Mutex::new(Vec::new()),
            })
        }
    }

    impl InferenceRuntime for ScriptedRuntime {
        fn transcribe(
            &self,
            samples: &[f32],
            sample_rate: u32,
            _options: &InferenceOptions,
        ) -> Result<InferenceOutput, TranscribeError> {
            self.seen_rates.lock().unwrap().push(sample_rate);
            self.seen_lens.lock().unwrap().push(samples.len());
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(InferenceOutput::Raw(String::new())))
        }
    }

    fn transcriber_with(
        runtime: Arc<ScriptedRuntime>,
        loads: Arc<AtomicUsize>,
    ) -> LocalSequentialTranscriber {
        LocalSequentialTranscriber::new(Box::new(move || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&runtime) as Arc<dyn InferenceRuntime>)
        }))
    }

    fn failing_loader() -> RuntimeLoader {
        Box::new(|| Err(TranscribeError::ModelLoad("model file missing".to_string())))
    }

    fn wav_segment(index: u32, sample_rate: u32, len: usize) -> AudioSegment {
        let samples = vec![0.25f32; len];
        let start = f64::from(index - 1) * 10.0;
        AudioSegment::new(
            wav::encode_wav_f32(&samples, sample_rate),
            format!("recording_segment_{:03}.wav", index),
            start,
            start + 10.0,
            index,
        )
    }

    fn progress_sink() -> (
        Arc<Mutex<Vec<TranscriptionProgress>>>,
        impl Fn(TranscriptionProgress) + Send + Sync,
    ) {
        let seen: Arc<Mutex<Vec<TranscriptionProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |progress| sink.lock().unwrap().push(progress))
    }

    #[tokio::test]
    async fn test_normalizes_every_runtime_output_shape() {
        let runtime = ScriptedRuntime::new(vec![
            Ok(InferenceOutput::Raw("  hello  ".into())),
            Ok(InferenceOutput::Text {
                text: "from the model ".into(),
            }),
            Ok(InferenceOutput::Chunks {
                chunks: vec![
                    TimedChunk {
                        text: "one ".into(),
                        start: None,
                        end: None,
                    },
                    TimedChunk {
                        text: " two".into(),
                        start: None,
                        end: None,
                    },
                ],
            }),
        ]);
        let service = transcriber_with(runtime, Arc::new(AtomicUsize::new(0)));
        let segments: Vec<AudioSegment> =
            (1..=3).map(|i| wav_segment(i, 16000, 160)).collect();

        let results = service.transcribe_segments(&segments, None).await.unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.transcription.as_str()).collect();
        assert_eq!(texts, vec!["hello", "from the model", "one two"]);
    }

    #[tokio::test]
    async fn test_resamples_to_the_runtime_rate() {
        let runtime = ScriptedRuntime::new(vec![Ok(InferenceOutput::Raw("ok".into()))]);
        let service = transcriber_with(Arc::clone(&runtime), Arc::new(AtomicUsize::new(0)));

        service
            .transcribe_segments(&[wav_segment(1, 8000, 800)], None)
            .await
            .unwrap();

        assert_eq!(*runtime.seen_rates.lock().unwrap(), vec![16000]);
        assert_eq!(*runtime.seen_lens.lock().unwrap(), vec![1600]);
    }

    #[tokio::test]
    async fn test_native_rate_input_is_passed_through() {
        let runtime = ScriptedRuntime::new(vec![Ok(InferenceOutput::Raw("ok".into()))]);
        let service = transcriber_with(Arc::clone(&runtime), Arc::new(AtomicUsize::new(0)));

        service
            .transcribe_segments(&[wav_segment(1, 16000, 1600)], None)
            .await
            .unwrap();

        assert_eq!(*runtime.seen_rates.lock().unwrap(), vec![16000]);
        assert_eq!(*runtime.seen_lens.lock().unwrap(), vec![1600]);
    }

    #[tokio::test]
    async fn test_runtime_loads_once_across_runs() {
        let runtime = ScriptedRuntime::new(Vec::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let service = transcriber_with(runtime, Arc::clone(&loads));
        let segments: Vec<AudioSegment> =
            (1..=2).map(|i| wav_segment(i, 16000, 160)).collect();

        service.transcribe_segments(&segments, None).await.unwrap();
        service.transcribe_segments(&segments, None).await.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_never_loads_the_runtime() {
        let runtime = ScriptedRuntime::new(Vec::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let service = transcriber_with(runtime, Arc::clone(&loads));
        let (seen, on_progress) = progress_sink();

        let results = service
            .transcribe_segments(&[], Some(&on_progress))
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_failure_rejects_the_whole_run() {
        let service = LocalSequentialTranscriber::new(failing_loader());

        let err = service
            .transcribe_segments(&[wav_segment(1, 16000, 160)], None)
            .await
            .unwrap_err();

        assert!(matches!(err, TranscribeError::ModelLoad(_)));
    }

    #[tokio::test]
    async fn test_inference_failure_degrades_single_segment() {
        let runtime = ScriptedRuntime::new(vec![
            Ok(InferenceOutput::Raw("first".into())),
            Err(TranscribeError::Inference("bad tensor".into())),
            Ok(InferenceOutput::Raw("third".into())),
        ]);
        let service = transcriber_with(runtime, Arc::new(AtomicUsize::new(0)));
        let segments: Vec<AudioSegment> =
            (1..=3).map(|i| wav_segment(i, 16000, 160)).collect();
        let (seen, on_progress) = progress_sink();

        let results = service
            .transcribe_segments(&segments, Some(&on_progress))
            .await
            .unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.transcription.as_str()).collect();
        assert_eq!(
            texts,
            vec!["first", "[Error transcribing segment 2]", "third"]
        );

        let completed: Vec<usize> = seen.lock().unwrap().iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_undecodable_buffer_degrades_single_segment() {
        let runtime = ScriptedRuntime::new(vec![
            Ok(InferenceOutput::Raw("first".into())),
            Ok(InferenceOutput::Raw("third".into())),
        ]);
        let service = transcriber_with(runtime, Arc::new(AtomicUsize::new(0)));

        let mut segments: Vec<AudioSegment> = vec![
            wav_segment(1, 16000, 160),
            wav_segment(2, 16000, 160),
            wav_segment(3, 16000, 160),
        ];
        segments[1].buffer = b"definitely not audio".to_vec();

        let results = service.transcribe_segments(&segments, None).await.unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.transcription.as_str()).collect();
        assert_eq!(
            texts,
            vec!["first", "[Error transcribing segment 2]", "third"]
        );
    }
}

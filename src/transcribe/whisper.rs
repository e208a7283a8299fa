// src/transcribe/whisper.rs
// whisper.cpp inference runtime (whisper-local feature)

use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::runtime::{
    InferenceOptions, InferenceOutput, InferenceRuntime, InferenceTask, TimedChunk,
    TARGET_SAMPLE_RATE,
};
use super::types::TranscribeError;

/// On-device runtime backed by whisper.cpp.
///
/// The model context is loaded once in the constructor; every invocation
/// gets its own decoding state, so the context stays read-only.
pub struct WhisperRuntime {
    ctx: WhisperContext,
}

impl WhisperRuntime {
    pub fn new(model_path: &Path) -> Result<Self, TranscribeError> {
        if !model_path.exists() {
            return Err(TranscribeError::ModelLoad(format!(
                "model not found at {}",
                model_path.display()
            )));
        }

        let path = model_path
            .to_str()
            .ok_or_else(|| TranscribeError::ModelLoad("invalid model path".to_string()))?;

        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| TranscribeError::ModelLoad(e.to_string()))?;

        tracing::info!(model = %model_path.display(), "Whisper runtime loaded");

        Ok(Self { ctx })
    }
}

impl InferenceRuntime for WhisperRuntime {
    fn transcribe(
        &self,
        samples: &[f32],
        sample_rate: u32,
        options: &InferenceOptions,
    ) -> Result<InferenceOutput, TranscribeError> {
        if sample_rate != TARGET_SAMPLE_RATE {
            return Err(TranscribeError::Inference(format!(
                "expected {} Hz input, got {}",
                TARGET_SAMPLE_RATE, sample_rate
            )));
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscribeError::Inference(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        let language = options.language.as_deref().unwrap_or("auto");
        params.set_language(Some(language));
        params.set_translate(options.task == InferenceTask::Translate);
        params.set_token_timestamps(options.timestamps);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_threads() as i32);

        state
            .full(params, samples)
            .map_err(|e| TranscribeError::Inference(e.to_string()))?;

        let mut chunks = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let mut text = String::new();
            let mut start = None;
            let mut end = None;

            let n_tokens = segment.n_tokens();
            for tok_idx in 0..n_tokens {
                let token = match segment.get_token(tok_idx) {
                    Some(t) => t,
                    None => continue,
                };

                let piece = match token.to_str() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Special tokens ([_BEG_], <|endoftext|>, ...) carry no speech.
                let trimmed = piece.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }

                if options.timestamps {
                    let data = token.token_data();
                    // Token timestamps are in centiseconds (10ms units)
                    let t0 = data.t0 as f32 / 100.0;
                    let t1 = data.t1 as f32 / 100.0;
                    if start.is_none() {
                        start = Some(t0);
                    }
                    end = Some(t1);
                }

                text.push_str(piece);
            }

            let text = text.trim().to_string();
            if !text.is_empty() {
                chunks.push(TimedChunk { text, start, end });
            }
        }

        Ok(InferenceOutput::Chunks { chunks })
    }
}

fn num_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

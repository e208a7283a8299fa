use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_SLICE_DURATION_SECS;
use crate::transcribe::DEFAULT_MAX_CONCURRENT_REQUESTS;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_MODEL: &str = "whisper-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    Remote,
    Local,
}

/// Pipeline configuration, sourced from the environment (`.env` supported).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub mode: TranscriptionMode,
    pub max_concurrent_requests: usize,
    pub slice_duration_secs: f64,
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub whisper_model_path: Option<PathBuf>,
    /// `None` means automatic language detection.
    pub language: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: TranscriptionMode::Remote,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            slice_duration_secs: DEFAULT_SLICE_DURATION_SECS,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            whisper_model_path: None,
            language: None,
        }
    }
}

impl PipelineConfig {
    /// Read configuration from the environment, falling back to defaults for
    /// anything unset or malformed.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mode = env::var("TRANSCRIBE_MODE")
            .map(|v| normalize_mode(&v))
            .unwrap_or(TranscriptionMode::Remote);

        let max_concurrent_requests = env::var("MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS);

        let slice_duration_secs = env::var("SLICE_DURATION_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|&v| v > 0.0)
            .unwrap_or(DEFAULT_SLICE_DURATION_SECS);

        let api_url = env::var("STT_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = env::var("STT_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let model = env::var("STT_MODEL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let whisper_model_path = match env::var("WHISPER_MODEL").ok().map(PathBuf::from) {
            Some(path) if path.exists() => Some(path),
            Some(path) => {
                tracing::warn!("Whisper model not found at {}", path.display());
                default_whisper_model()
            }
            None => default_whisper_model(),
        };

        let language = env::var("WHISPER_LANG")
            .ok()
            .and_then(|v| normalize_language(&v));

        Self {
            mode,
            max_concurrent_requests,
            slice_duration_secs,
            api_url,
            api_key,
            model,
            whisper_model_path,
            language,
        }
    }
}

pub fn normalize_mode(input: &str) -> TranscriptionMode {
    match input.trim().to_lowercase().as_str() {
        "local" | "on-device" => TranscriptionMode::Local,
        _ => TranscriptionMode::Remote,
    }
}

/// "auto" and empty both mean automatic detection.
pub fn normalize_language(input: &str) -> Option<String> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() || trimmed == "auto" {
        None
    } else {
        Some(trimmed)
    }
}

fn default_whisper_model() -> Option<PathBuf> {
    let candidates = [
        "models/ggml-base.bin",
        "models/ggml-base.en.bin",
        "models/ggml-small.bin",
        "models/ggml-small.en.bin",
    ];

    for c in candidates {
        let path = PathBuf::from(c);
        if path.exists() {
            return Some(path);
        }
    }

    // Fallback: any ggml-*.bin in models/
    let dir = PathBuf::from("models");
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension() == Some(OsStr::new("bin")) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if name.starts_with("ggml-") {
                        return Some(path);
                    }
                }
            }
        }
    }

    None
}

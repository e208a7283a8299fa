use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use segscribe::config::{normalize_language, normalize_mode, PipelineConfig, TranscriptionMode};
use segscribe::media::SymphoniaConverter;
use segscribe::session::{AudioSplitter, TranscriptionSession};
use segscribe::transcribe::{
    HttpSpeechBackend, RemoteBatchTranscriber, TranscriptionProgress, TranscriptionService,
};

/// Segmented transcription for long audio and video recordings.
#[derive(Parser)]
#[command(name = "segscribe")]
struct Cli {
    /// Input audio or video file.
    input: PathBuf,

    /// Output transcript file (defaults to a timestamped transcript_*.txt).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Execution strategy: remote or local.
    #[arg(long)]
    mode: Option<String>,

    /// Maximum in-flight remote requests.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Segment slice duration, seconds.
    #[arg(long)]
    slice_duration: Option<f64>,

    /// Path to a local whisper model (ggml *.bin).
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Transcription language hint (default: auto-detect).
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env();
    if let Some(mode) = cli.mode.as_deref() {
        config.mode = normalize_mode(mode);
    }
    if let Some(concurrency) = cli.concurrency.filter(|&c| c > 0) {
        config.max_concurrent_requests = concurrency;
    }
    if let Some(slice) = cli.slice_duration.filter(|&s| s > 0.0) {
        config.slice_duration_secs = slice;
    }
    if let Some(path) = cli.model_path {
        config.whisper_model_path = Some(path);
    }
    if let Some(language) = cli.language.as_deref() {
        config.language = normalize_language(language);
    }

    let data = tokio::fs::read(&cli.input).await?;
    let converter = SymphoniaConverter::from_bytes(&data)?;

    let service = build_service(&config)?;
    let splitter = AudioSplitter::with_slice_duration(config.slice_duration_secs);
    let session = TranscriptionSession::with_splitter(service, splitter);

    let source_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording")
        .to_string();

    let on_progress = |progress: TranscriptionProgress| {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            "Transcription progress"
        );
    };

    let result = session
        .run(&converter, &source_name, Some(&on_progress))
        .await?;

    let output = cli.output.unwrap_or_else(default_output_path);
    tokio::fs::write(&output, &result.transcript).await?;

    tracing::info!(
        output = %output.display(),
        segments = result.segments.len(),
        "Transcript written"
    );

    Ok(())
}

fn build_service(
    config: &PipelineConfig,
) -> Result<Arc<dyn TranscriptionService>, Box<dyn std::error::Error>> {
    match config.mode {
        TranscriptionMode::Remote => {
            let api_key = config
                .api_key
                .clone()
                .ok_or("STT_API_KEY is not set")?;
            let backend = Arc::new(HttpSpeechBackend::new(
                config.api_url.clone(),
                api_key,
                config.model.clone(),
            ));
            Ok(Arc::new(RemoteBatchTranscriber::with_concurrency(
                backend,
                config.max_concurrent_requests,
            )))
        }
        TranscriptionMode::Local => build_local_service(config),
    }
}

#[cfg(feature = "whisper-local")]
fn build_local_service(
    config: &PipelineConfig,
) -> Result<Arc<dyn TranscriptionService>, Box<dyn std::error::Error>> {
    use segscribe::transcribe::{InferenceOptions, LocalSequentialTranscriber};

    let model_path = config.whisper_model_path.clone().ok_or(
        "no whisper model found; set WHISPER_MODEL or place a ggml-*.bin under models/",
    )?;
    let options = InferenceOptions {
        language: config.language.clone(),
        ..InferenceOptions::default()
    };
    Ok(Arc::new(LocalSequentialTranscriber::from_model_path(
        model_path, options,
    )))
}

#[cfg(not(feature = "whisper-local"))]
fn build_local_service(
    _config: &PipelineConfig,
) -> Result<Arc<dyn TranscriptionService>, Box<dyn std::error::Error>> {
    Err("local mode requires building with the `whisper-local` feature".into())
}

fn default_output_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("transcript_{}.txt", stamp))
}

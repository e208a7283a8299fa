//! Segmented transcription pipeline: cut a long recording into fixed-length
//! segments and turn N independent speech-to-text calls into one ordered,
//! partially-fault-tolerant transcript, via a remote batched strategy or a
//! local sequential one.

pub mod audio;
pub mod config;
pub mod media;
pub mod session;
pub mod transcribe;

pub use config::{PipelineConfig, TranscriptionMode};
pub use media::{MediaConverter, MediaError, SymphoniaConverter};
pub use session::{
    assemble_transcript, AudioSegment, AudioSplitter, SessionError, SessionResult, SplitError,
    TranscriptionSession,
};
pub use transcribe::{
    error_placeholder, HttpSpeechBackend, InferenceOptions, InferenceOutput, InferenceRuntime,
    LocalSequentialTranscriber, RemoteBatchTranscriber, SpeechBackend, TranscribeError,
    TranscriptionProgress, TranscriptionResult, TranscriptionService,
};
#[cfg(feature = "whisper-local")]
pub use transcribe::WhisperRuntime;

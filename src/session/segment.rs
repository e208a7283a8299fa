use serde::Serialize;

/// A bounded time-slice of the source recording, the unit of transcription
/// work. Created once by the splitter and immutable afterwards except for
/// the late-bound transcription.
#[derive(Debug, Clone, Serialize)]
pub struct AudioSegment {
    /// Raw encoded audio bytes covering `[start_time, end_time)`.
    #[serde(skip)]
    pub buffer: Vec<u8>,
    /// Derived display name; not semantically load-bearing.
    pub file_name: String,
    /// Window start in seconds from the beginning of the recording.
    pub start_time: f64,
    /// Window end in seconds; always greater than `start_time`.
    pub end_time: f64,
    /// 1-based position in the original recording; unique within a batch and
    /// the canonical ordering for all downstream results.
    pub index: u32,
    /// Filled in by a run; absent on first creation.
    pub transcription: Option<String>,
}

impl AudioSegment {
    pub fn new(
        buffer: Vec<u8>,
        file_name: String,
        start_time: f64,
        end_time: f64,
        index: u32,
    ) -> Self {
        Self {
            buffer,
            file_name,
            start_time,
            end_time,
            index,
            transcription: None,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn set_transcription(&mut self, transcription: String) {
        self.transcription = Some(transcription);
    }

    pub fn is_transcribed(&self) -> bool {
        self.transcription.is_some()
    }
}

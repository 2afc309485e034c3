use std::path::Path;

use async_trait::async_trait;

/// Transcript of a single prepared segment, with the language the
/// engine believes it heard (raw, not yet normalized).
#[derive(Debug, Clone)]
pub struct SegmentTranscript {
    pub text: String,
    pub language: Option<String>,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe one segment file. `language` is an explicit ISO-639-1
    /// hint, or `None` for auto-detection.
    async fn transcribe(
        &self,
        path: &Path,
        language: Option<&str>,
    ) -> Result<SegmentTranscript, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio file unreadable: {0}")]
    FileUnreadable(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

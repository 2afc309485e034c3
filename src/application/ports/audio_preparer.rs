use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Ordered list of files ready to send to the transcription API, plus
/// the scratch directory they live in (if any was needed). Callers own
/// cleanup of the scratch directory.
#[derive(Debug, Clone)]
pub struct PreparedAudio {
    pub segments: Vec<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
}

impl PreparedAudio {
    pub fn passthrough(path: PathBuf) -> Self {
        Self {
            segments: vec![path],
            scratch_dir: None,
        }
    }
}

#[async_trait]
pub trait AudioPreparer: Send + Sync {
    /// Measure the duration of a local audio file in seconds. An
    /// unparsable container is a hard failure, never a zero.
    async fn duration_seconds(&self, path: &Path) -> Result<f64, AudioPrepError>;

    /// Produce one or more files, each at or under `limit_bytes`.
    /// Files already under the limit are returned unchanged.
    async fn prepare(&self, path: &Path, limit_bytes: u64)
        -> Result<PreparedAudio, AudioPrepError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioPrepError {
    #[error("duration unmeasurable: {0}")]
    DurationUnmeasurable(String),
    #[error("audio tooling unavailable: {0}")]
    ToolingUnavailable(String),
    #[error("transcode failed: {0}")]
    TranscodeFailed(String),
    #[error("split produced no segments: {0}")]
    SplitFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{AudioPrepError, AudioPreparer, PreparedAudio};

/// Scripted preparer for tests: fixed duration, fixed segment list,
/// optional failure injection.
pub struct MockAudioPreparer {
    duration: Mutex<Result<f64, String>>,
    segments: Mutex<Option<Vec<PathBuf>>>,
    fail_prepare: Mutex<Option<String>>,
}

impl MockAudioPreparer {
    pub fn with_duration(seconds: f64) -> Self {
        Self {
            duration: Mutex::new(Ok(seconds)),
            segments: Mutex::new(None),
            fail_prepare: Mutex::new(None),
        }
    }

    pub fn unmeasurable(reason: &str) -> Self {
        Self {
            duration: Mutex::new(Err(reason.to_string())),
            segments: Mutex::new(None),
            fail_prepare: Mutex::new(None),
        }
    }

    /// Override the segment list returned by `prepare` (default: the
    /// input path unchanged).
    pub fn set_segments(&self, segments: Vec<PathBuf>) {
        *self.segments.lock().unwrap() = Some(segments);
    }

    pub fn fail_prepare_with(&self, reason: &str) {
        *self.fail_prepare.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl AudioPreparer for MockAudioPreparer {
    async fn duration_seconds(&self, _path: &Path) -> Result<f64, AudioPrepError> {
        self.duration
            .lock()
            .unwrap()
            .clone()
            .map_err(AudioPrepError::DurationUnmeasurable)
    }

    async fn prepare(
        &self,
        path: &Path,
        _limit_bytes: u64,
    ) -> Result<PreparedAudio, AudioPrepError> {
        if let Some(reason) = self.fail_prepare.lock().unwrap().clone() {
            return Err(AudioPrepError::ToolingUnavailable(reason));
        }
        match self.segments.lock().unwrap().clone() {
            Some(segments) => Ok(PreparedAudio {
                segments,
                scratch_dir: None,
            }),
            None => Ok(PreparedAudio::passthrough(path.to_path_buf())),
        }
    }
}

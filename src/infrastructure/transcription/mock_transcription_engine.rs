use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{SegmentTranscript, TranscriptionEngine, TranscriptionError};

/// Per-segment behavior for the scripted engine, keyed by the
/// segment's file name.
#[derive(Debug, Clone)]
pub enum ScriptedSegment {
    Text { text: String, language: Option<String> },
    Fail(String),
    /// Sleep longer than any reasonable per-call timeout.
    Hang(Duration),
}

/// Scripted transcription engine for tests; records how many calls it
/// received so tests can assert that gated jobs never reach the paid
/// API.
pub struct MockTranscriptionEngine {
    script: Mutex<HashMap<String, ScriptedSegment>>,
    calls: AtomicUsize,
}

impl MockTranscriptionEngine {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn script_segment(&self, file_name: &str, behavior: ScriptedSegment) {
        self.script
            .lock()
            .unwrap()
            .insert(file_name.to_string(), behavior);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTranscriptionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        path: &Path,
        _language: Option<&str>,
    ) -> Result<SegmentTranscript, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let behavior = self.script.lock().unwrap().get(&key).cloned();

        match behavior {
            Some(ScriptedSegment::Text { text, language }) => {
                Ok(SegmentTranscript { text, language })
            }
            Some(ScriptedSegment::Fail(reason)) => {
                Err(TranscriptionError::ApiRequestFailed(reason))
            }
            Some(ScriptedSegment::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(SegmentTranscript {
                    text: "too late".to_string(),
                    language: None,
                })
            }
            None => Ok(SegmentTranscript {
                text: format!("transcript of {}", key),
                language: Some("en".to_string()),
            }),
        }
    }
}

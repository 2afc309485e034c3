use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{normalize_language, LanguageHint};

/// Combined result of transcribing every prepared segment of one job.
#[derive(Debug, Clone)]
pub struct TranscriptionOutcome {
    pub transcript: String,
    /// Normalized two-letter code: the explicit hint when one was
    /// given, otherwise whatever the first segment detected.
    pub detected_language: String,
    pub failed_segments: usize,
    pub total_segments: usize,
}

/// Sends prepared segments to the speech-to-text engine and reassembles
/// the transcript in segment order. Segment calls may run in parallel
/// up to `max_concurrency`; reassembly is by index, so completion order
/// never matters.
pub struct TranscriptionService {
    engine: Arc<dyn TranscriptionEngine>,
    max_concurrency: usize,
    call_timeout: Duration,
    default_language: String,
}

impl TranscriptionService {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        max_concurrency: usize,
        call_timeout: Duration,
        default_language: String,
    ) -> Self {
        Self {
            engine,
            max_concurrency: max_concurrency.max(1),
            call_timeout,
            default_language,
        }
    }

    pub async fn transcribe_segments(
        &self,
        segments: &[PathBuf],
        hint: &LanguageHint,
    ) -> TranscriptionOutcome {
        let explicit = hint.explicit_code();

        let mut results: Vec<_> =
            stream::iter(segments.iter().enumerate().map(|(index, path)| {
                let engine = Arc::clone(&self.engine);
                let path = path.clone();
                let timeout = self.call_timeout;
                async move {
                    let result = match tokio::time::timeout(
                        timeout,
                        engine.transcribe(&path, explicit),
                    )
                    .await
                    {
                        Ok(inner) => inner,
                        Err(_) => Err(TranscriptionError::ApiRequestFailed(format!(
                            "timed out after {:?}",
                            timeout
                        ))),
                    };
                    (index, result)
                }
            }))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut texts = Vec::with_capacity(results.len());
        let mut first_detected: Option<String> = None;
        let mut failed = 0usize;

        for (index, result) in results {
            match result {
                Ok(segment) => {
                    if index == 0 {
                        first_detected = segment.language.clone();
                    }
                    texts.push(segment.text);
                }
                Err(e) => {
                    // A failed segment contributes an empty string; a
                    // partial transcript beats none.
                    tracing::warn!(segment = index, error = %e, "Segment transcription failed");
                    failed += 1;
                    texts.push(String::new());
                }
            }
        }

        let transcript = texts.join("\n").trim().to_string();

        let detected_language = match explicit {
            Some(code) => code.to_string(),
            None => normalize_language(
                first_detected.as_deref().unwrap_or(""),
                &self.default_language,
            ),
        };

        tracing::info!(
            segments = segments.len(),
            failed,
            chars = transcript.len(),
            language = %detected_language,
            "Transcription assembled"
        );

        TranscriptionOutcome {
            transcript,
            detected_language,
            failed_segments: failed,
            total_segments: segments.len(),
        }
    }
}

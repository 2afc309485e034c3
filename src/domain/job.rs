use chrono::{DateTime, Utc};

use super::{JobId, JobStatus, UserId};

/// One audio-processing request. A single strongly-typed record is the
/// whole schema; fields that are unknown until later in the pipeline
/// are `Option`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub filename: String,
    pub original_filename: String,
    /// Stored language hint: `"auto"` or a normalized two-letter code.
    pub language: String,
    /// Populated after transcription, from the first segment.
    pub language_detected: Option<String>,
    pub status: JobStatus,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    /// Measured duration in whole seconds. Set before the job is
    /// allowed to start processing and never changed afterwards; the
    /// usage ledger sums this column.
    pub duration_seconds: i64,
    pub size_bytes: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        user_id: UserId,
        filename: String,
        original_filename: String,
        language: String,
        duration_seconds: i64,
        size_bytes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            user_id,
            filename,
            original_filename,
            language,
            language_detected: None,
            status: JobStatus::Queued,
            transcript: None,
            summary: None,
            duration_seconds,
            size_bytes,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

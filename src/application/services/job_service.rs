use std::path::Path;
use std::sync::Arc;

use tracing::Instrument;

use crate::application::ports::{
    AudioPrepError, AudioPreparer, JobRepository, RepositoryError,
};
use crate::domain::{Job, JobId, JobStatus, LanguageHint, UserId};

use super::text_cleanup::{clean_summary, clean_transcript};
use super::{CreditError, SummaryService, TranscriptionService, UsageService};

#[derive(Debug, thiserror::Error)]
pub enum CreateJobError {
    #[error("insufficient credit: need {required_seconds}s, {remaining_seconds}s remaining")]
    InsufficientCredit {
        required_seconds: i64,
        remaining_seconds: i64,
    },
    #[error("duration unmeasurable: {0}")]
    DurationUnmeasurable(String),
    #[error("audio preparation unavailable: {0}")]
    PreparationUnavailable(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

/// Composition root of the pipeline: measure, gate on credit, prepare,
/// transcribe, summarize, persist. All collaborators are injected at
/// construction so tests can substitute fakes.
pub struct JobService {
    preparer: Arc<dyn AudioPreparer>,
    transcription: Arc<TranscriptionService>,
    summarizer: Arc<SummaryService>,
    usage: Arc<UsageService>,
    jobs: Arc<dyn JobRepository>,
    upload_limit_bytes: u64,
    default_language: String,
}

impl JobService {
    pub fn new(
        preparer: Arc<dyn AudioPreparer>,
        transcription: Arc<TranscriptionService>,
        summarizer: Arc<SummaryService>,
        usage: Arc<UsageService>,
        jobs: Arc<dyn JobRepository>,
        upload_limit_bytes: u64,
        default_language: String,
    ) -> Self {
        Self {
            preparer,
            transcription,
            summarizer,
            usage,
            jobs,
            upload_limit_bytes,
            default_language,
        }
    }

    /// Run one file through the whole pipeline. Returns the persisted
    /// job, which lands in `done` or, when transcription produced no
    /// usable text, in `error`. Credit and preparation problems are
    /// typed errors so the caller can route the user (top up, retry).
    pub async fn create_job(
        &self,
        user_id: UserId,
        path: &Path,
        original_filename: &str,
        language_raw: &str,
    ) -> Result<Job, CreateJobError> {
        let hint = LanguageHint::parse(language_raw, &self.default_language);

        let duration = match self.preparer.duration_seconds(path).await {
            Ok(seconds) if seconds > 0.0 => seconds,
            Ok(_) => {
                return Err(CreateJobError::DurationUnmeasurable(
                    "probe reported a non-positive duration".to_string(),
                ))
            }
            Err(e) => return Err(CreateJobError::DurationUnmeasurable(e.to_string())),
        };
        let required_seconds = duration.ceil() as i64;

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| original_filename.to_string());

        let job = Job::new(
            user_id,
            filename,
            original_filename.to_string(),
            hint.as_str().to_string(),
            required_seconds,
            size_bytes,
        );

        // Credit gate before any paid external call. Inserting the job
        // row inside the per-user reservation lock is what charges the
        // measured duration.
        match self.usage.reserve(&job).await {
            Ok(()) => {}
            Err(CreditError::InsufficientCredit {
                required_seconds,
                remaining_seconds,
            }) => {
                return Err(CreateJobError::InsufficientCredit {
                    required_seconds,
                    remaining_seconds,
                })
            }
            Err(CreditError::Repository(e)) => return Err(e.into()),
        }

        let span = tracing::info_span!(
            "audio_job",
            job_id = %job.id,
            user_id = %job.user_id,
            duration_seconds = required_seconds,
        );
        self.run_pipeline(&job, path, &hint).instrument(span).await
    }

    async fn run_pipeline(
        &self,
        job: &Job,
        path: &Path,
        hint: &LanguageHint,
    ) -> Result<Job, CreateJobError> {
        self.jobs
            .update_status(job.id, JobStatus::Processing, None)
            .await?;

        let prepared = match self.preparer.prepare(path, self.upload_limit_bytes).await {
            Ok(prepared) => prepared,
            Err(e) => {
                let message = e.to_string();
                self.fail_job(job.id, &message).await?;
                return match e {
                    AudioPrepError::ToolingUnavailable(detail) => {
                        Err(CreateJobError::PreparationUnavailable(detail))
                    }
                    other => Err(CreateJobError::PreparationUnavailable(other.to_string())),
                };
            }
        };

        let outcome = self
            .transcription
            .transcribe_segments(&prepared.segments, hint)
            .await;

        if let Some(scratch) = &prepared.scratch_dir {
            if let Err(e) = tokio::fs::remove_dir_all(scratch).await {
                tracing::warn!(path = %scratch.display(), error = %e, "Failed to clean scratch dir");
            }
        }

        if outcome.transcript.is_empty() {
            // A job must never reach `done` with nothing to show.
            self.fail_job(job.id, "no usable transcript produced").await?;
            return self.reload(job.id).await;
        }

        let transcript = clean_transcript(&outcome.transcript);
        let summary = clean_summary(
            &self
                .summarizer
                .summarize(&transcript, &outcome.detected_language)
                .await,
        );

        self.jobs
            .store_results(job.id, &transcript, &summary, &outcome.detected_language)
            .await?;

        tracing::info!(
            failed_segments = outcome.failed_segments,
            total_segments = outcome.total_segments,
            "Job completed"
        );

        self.reload(job.id).await
    }

    pub async fn job(
        &self,
        user_id: &UserId,
        id: JobId,
    ) -> Result<Option<Job>, RepositoryError> {
        let job = self.jobs.get_by_id(id).await?;
        Ok(job.filter(|j| &j.user_id == user_id))
    }

    pub async fn history(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Job>, RepositoryError> {
        self.jobs.list_recent(user_id, limit).await
    }

    async fn fail_job(&self, id: JobId, message: &str) -> Result<(), RepositoryError> {
        tracing::error!(job_id = %id, message, "Job failed");
        self.jobs
            .update_status(id, JobStatus::Error, Some(message))
            .await
    }

    async fn reload(&self, id: JobId) -> Result<Job, CreateJobError> {
        self.jobs
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::Corrupted(format!("job {} vanished", id)).into())
    }
}

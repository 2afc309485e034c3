use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Job, JobId, JobStatus, UserId};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Persist the pipeline outputs and move the job to `done` in one
    /// write.
    async fn store_results(
        &self,
        id: JobId,
        transcript: &str,
        summary: &str,
        language_detected: &str,
    ) -> Result<(), RepositoryError>;

    /// Total measured seconds across all of the user's jobs, whatever
    /// their terminal status. This sum is the "used" side of the
    /// usage ledger.
    async fn sum_duration_seconds(&self, user_id: &UserId) -> Result<i64, RepositoryError>;

    async fn list_recent(&self, user_id: &UserId, limit: i64)
        -> Result<Vec<Job>, RepositoryError>;
}

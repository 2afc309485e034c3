use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, UserId};

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOB_COLUMNS: &str = "id, user_id, filename, original_filename, language, \
     language_detected, status, transcript, summary, duration_seconds, size_bytes, \
     error_message, created_at, updated_at";

fn job_from_row(row: &PgRow) -> Result<Job, RepositoryError> {
    let corrupted = |e: sqlx::Error| RepositoryError::Corrupted(e.to_string());

    let status: String = row.try_get("status").map_err(corrupted)?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::Corrupted)?;
    let user_id: String = row.try_get("user_id").map_err(corrupted)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupted)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupted)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id").map_err(corrupted)?),
        user_id: UserId::new(user_id),
        filename: row.try_get("filename").map_err(corrupted)?,
        original_filename: row.try_get("original_filename").map_err(corrupted)?,
        language: row.try_get("language").map_err(corrupted)?,
        language_detected: row.try_get("language_detected").map_err(corrupted)?,
        status,
        transcript: row.try_get("transcript").map_err(corrupted)?,
        summary: row.try_get("summary").map_err(corrupted)?,
        duration_seconds: row.try_get("duration_seconds").map_err(corrupted)?,
        size_bytes: row.try_get("size_bytes").map_err(corrupted)?,
        error_message: row.try_get("error_message").map_err(corrupted)?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO jobs (id, user_id, filename, original_filename, language, \
             language_detected, status, transcript, summary, duration_seconds, size_bytes, \
             error_message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(job.id.as_uuid())
        .bind(job.user_id.as_str())
        .bind(&job.filename)
        .bind(&job.original_filename)
        .bind(&job.language)
        .bind(&job.language_detected)
        .bind(job.status.as_str())
        .bind(&job.transcript)
        .bind(&job.summary)
        .bind(job.duration_seconds)
        .bind(job.size_bytes)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self, error_message), fields(job_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE jobs SET status = $1, error_message = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, transcript, summary), fields(job_id = %id))]
    async fn store_results(
        &self,
        id: JobId,
        transcript: &str,
        summary: &str,
        language_detected: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE jobs SET transcript = $1, summary = $2, language_detected = $3, \
             status = $4, error_message = NULL, updated_at = $5 WHERE id = $6",
        )
        .bind(transcript)
        .bind(summary)
        .bind(language_detected)
        .bind(JobStatus::Done.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn sum_duration_seconds(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(duration_seconds), 0)::BIGINT AS total \
             FROM jobs WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.try_get("total")
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Job>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            JOB_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(job_from_row).collect()
    }
}

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{
    JobRepository, PaymentInsert, PaymentRepository, RepositoryError,
};
use crate::domain::{Job, JobId, JobStatus, Payment, PaymentStatus, UserId};

/// In-process job store. Backs unit/integration tests and local runs
/// without Postgres; enforces the same monotone status transitions the
/// domain requires.
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::QueryFailed(format!("job {} not found", id)))?;
        if !job.status.can_transition_to(status) {
            return Err(RepositoryError::QueryFailed(format!(
                "illegal transition {} -> {}",
                job.status, status
            )));
        }
        job.status = status;
        job.error_message = error_message.map(str::to_string);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn store_results(
        &self,
        id: JobId,
        transcript: &str,
        summary: &str,
        language_detected: &str,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::QueryFailed(format!("job {} not found", id)))?;
        if !job.status.can_transition_to(JobStatus::Done) {
            return Err(RepositoryError::QueryFailed(format!(
                "illegal transition {} -> done",
                job.status
            )));
        }
        job.transcript = Some(transcript.to_string());
        job.summary = Some(summary.to_string());
        job.language_detected = Some(language_detected.to_string());
        job.status = JobStatus::Done;
        job.error_message = None;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn sum_duration_seconds(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| &j.user_id == user_id)
            .map(|j| j.duration_seconds)
            .sum())
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| &j.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }
}

/// In-process payment store with the same `(provider, order_id)`
/// uniqueness the Postgres schema enforces.
pub struct InMemoryPaymentRepository {
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self {
            payments: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPaymentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<PaymentInsert, RepositoryError> {
        let mut payments = self.payments.lock().unwrap();
        let duplicate = payments.iter().any(|p| {
            p.provider == payment.provider && p.provider_order_id == payment.provider_order_id
        });
        if duplicate {
            return Ok(PaymentInsert::Duplicate);
        }
        payments.push(payment.clone());
        Ok(PaymentInsert::Inserted)
    }

    async fn find_by_order(
        &self,
        provider: &str,
        provider_order_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.provider == provider && p.provider_order_id == provider_order_id)
            .cloned())
    }

    async fn sum_captured_minutes(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| &p.user_id == user_id && p.status == PaymentStatus::Captured)
            .map(|p| p.minutes)
            .sum())
    }
}

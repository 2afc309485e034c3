use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{JobRepository, PaymentRepository, RepositoryError};
use crate::domain::{Job, UsageBalance, UserId};

/// The usage ledger: a computed view over jobs and captured payments.
/// `reserve` serializes per user so two concurrent uploads cannot both
/// pass the credit check against the same remaining balance.
pub struct UsageService {
    jobs: Arc<dyn JobRepository>,
    payments: Arc<dyn PaymentRepository>,
    free_tier_minutes: i64,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    #[error("insufficient credit: need {required_seconds}s, {remaining_seconds}s remaining")]
    InsufficientCredit {
        required_seconds: i64,
        remaining_seconds: i64,
    },
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl UsageService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        payments: Arc<dyn PaymentRepository>,
        free_tier_minutes: i64,
    ) -> Self {
        Self {
            jobs,
            payments,
            free_tier_minutes,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn balance(&self, user_id: &UserId) -> Result<UsageBalance, RepositoryError> {
        let paid_minutes = self.payments.sum_captured_minutes(user_id).await?;
        let used_seconds = self.jobs.sum_duration_seconds(user_id).await?;
        Ok(UsageBalance {
            used_seconds,
            allowance_seconds: (self.free_tier_minutes + paid_minutes) * 60,
        })
    }

    /// Check remaining credit and persist the job row atomically with
    /// respect to other reservations for the same user. The inserted
    /// row carries the measured duration, and `used` sums every
    /// measured job, so the insert itself is the reservation: the same
    /// duration can never be charged twice.
    pub async fn reserve(&self, job: &Job) -> Result<(), CreditError> {
        let lock = self.lock_for(&job.user_id).await;
        let _guard = lock.lock().await;

        let balance = self.balance(&job.user_id).await?;
        let remaining = balance.remaining_seconds();
        if job.duration_seconds > remaining {
            tracing::info!(
                user_id = %job.user_id,
                required_seconds = job.duration_seconds,
                remaining_seconds = remaining,
                "Job rejected: insufficient credit"
            );
            return Err(CreditError::InsufficientCredit {
                required_seconds: job.duration_seconds,
                remaining_seconds: remaining,
            });
        }

        self.jobs.create(job).await?;
        Ok(())
    }

    async fn lock_for(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user_id.clone()).or_default())
    }
}

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Payment, UserId};

/// Result of attempting to persist a captured payment. The unique
/// constraint on `(provider, provider_order_id)` turns a retried
/// capture into `Duplicate` rather than a second credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentInsert {
    Inserted,
    Duplicate,
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<PaymentInsert, RepositoryError>;

    async fn find_by_order(
        &self,
        provider: &str,
        provider_order_id: &str,
    ) -> Result<Option<Payment>, RepositoryError>;

    /// Sum of minutes across the user's `captured` payments; the paid
    /// part of the allowance.
    async fn sum_captured_minutes(&self, user_id: &UserId) -> Result<i64, RepositoryError>;
}

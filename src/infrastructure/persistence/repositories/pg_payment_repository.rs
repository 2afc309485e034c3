use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{PaymentInsert, PaymentRepository, RepositoryError};
use crate::domain::{Payment, PaymentStatus, UserId};

pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn payment_from_row(row: &PgRow) -> Result<Payment, RepositoryError> {
    let corrupted = |e: sqlx::Error| RepositoryError::Corrupted(e.to_string());

    let status: String = row.try_get("status").map_err(corrupted)?;
    let status = status
        .parse::<PaymentStatus>()
        .map_err(RepositoryError::Corrupted)?;
    let user_id: String = row.try_get("user_id").map_err(corrupted)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupted)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupted)?;

    Ok(Payment {
        id: row.try_get("id").map_err(corrupted)?,
        user_id: UserId::new(user_id),
        provider: row.try_get("provider").map_err(corrupted)?,
        provider_order_id: row.try_get("provider_order_id").map_err(corrupted)?,
        plan_code: row.try_get("plan_code").map_err(corrupted)?,
        minutes: row.try_get("minutes").map_err(corrupted)?,
        amount_cents: row.try_get("amount_cents").map_err(corrupted)?,
        currency: row.try_get("currency").map_err(corrupted)?,
        status,
        raw_payload: row.try_get("raw_payload").map_err(corrupted)?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    #[instrument(skip(self, payment), fields(order_id = %payment.provider_order_id))]
    async fn insert(&self, payment: &Payment) -> Result<PaymentInsert, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO payments (id, user_id, provider, provider_order_id, plan_code, \
             minutes, amount_cents, currency, status, raw_payload, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(payment.id)
        .bind(payment.user_id.as_str())
        .bind(&payment.provider)
        .bind(&payment.provider_order_id)
        .bind(&payment.plan_code)
        .bind(payment.minutes)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(&payment.raw_payload)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(PaymentInsert::Inserted),
            // The unique index on (provider, provider_order_id) turns a
            // retried capture into the idempotent-success case.
            Err(e) if is_unique_violation(&e) => Ok(PaymentInsert::Duplicate),
            Err(e) => Err(RepositoryError::QueryFailed(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_order(
        &self,
        provider: &str,
        provider_order_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, provider, provider_order_id, plan_code, minutes, \
             amount_cents, currency, status, raw_payload, created_at, updated_at \
             FROM payments WHERE provider = $1 AND provider_order_id = $2",
        )
        .bind(provider)
        .bind(provider_order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(payment_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn sum_captured_minutes(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(minutes), 0)::BIGINT AS total \
             FROM payments WHERE user_id = $1 AND status = 'captured'",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.try_get("total")
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

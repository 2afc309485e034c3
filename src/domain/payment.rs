use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Created,
    Captured,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(PaymentStatus::Created),
            "captured" => Ok(PaymentStatus::Captured),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment-provider transaction. `(provider, provider_order_id)`
/// is the idempotency key; the storage layer enforces uniqueness and a
/// duplicate insert is treated as "already captured".
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: UserId,
    pub provider: String,
    pub provider_order_id: String,
    pub plan_code: String,
    pub minutes: i64,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    /// Raw provider order payload, kept opaque for audit.
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn captured(
        user_id: UserId,
        provider: String,
        provider_order_id: String,
        plan_code: String,
        minutes: i64,
        amount_cents: i64,
        currency: String,
        raw_payload: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider,
            provider_order_id,
            plan_code,
            minutes,
            amount_cents,
            currency,
            status: PaymentStatus::Captured,
            raw_payload,
            created_at: now,
            updated_at: now,
        }
    }
}

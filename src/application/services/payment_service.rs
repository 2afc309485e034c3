use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::{
    PaymentGateway, PaymentGatewayError, PaymentInsert, PaymentRepository, RepositoryError,
};
use crate::domain::{Payment, PaymentStatus, UserId};

/// One purchasable plan: minutes granted and the expected price per
/// supported currency, in integer cents.
#[derive(Debug, Clone)]
pub struct Plan {
    pub code: String,
    pub minutes: i64,
    pub prices_cents: HashMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub user_id: UserId,
    pub order_id: String,
    pub plan_code: String,
    /// Client-reported, used only for discrepancy logging.
    pub claimed_minutes: i64,
    /// Client-reported, used only for discrepancy logging.
    pub claimed_amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReceipt {
    pub credited_minutes: i64,
    /// True when this call was a retry of an already-captured order.
    pub already_captured: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentCaptureError {
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error("payment not completed: provider reports '{0}'")]
    PaymentNotCompleted(String),
    #[error("amount mismatch: provider captured {provider_cents} cents, expected {expected_cents}")]
    AmountMismatch {
        provider_cents: i64,
        expected_cents: i64,
    },
    #[error("currency mismatch: provider used {provider}, expected {expected}")]
    CurrencyMismatch { provider: String, expected: String },
    #[error("provider lookup failed: {0}")]
    Gateway(#[from] PaymentGatewayError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validates a client-reported capture against the provider's
/// authoritative order record before crediting minutes. Idempotent on
/// the provider's order identifier; partial credit on ambiguous
/// provider state is forbidden.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    plans: HashMap<String, Plan>,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        plans: Vec<Plan>,
    ) -> Self {
        Self {
            gateway,
            payments,
            plans: plans.into_iter().map(|p| (p.code.clone(), p)).collect(),
        }
    }

    pub async fn capture(
        &self,
        request: CaptureRequest,
    ) -> Result<CaptureReceipt, PaymentCaptureError> {
        let plan = self
            .plans
            .get(&request.plan_code)
            .ok_or_else(|| PaymentCaptureError::UnknownPlan(request.plan_code.clone()))?;

        let provider = self.gateway.provider().to_string();

        // Fast path for webhook retries and double-clicks.
        if let Some(existing) = self
            .payments
            .find_by_order(&provider, &request.order_id)
            .await?
        {
            if existing.status == PaymentStatus::Captured {
                tracing::info!(
                    order_id = %request.order_id,
                    "Capture retried for already-captured order, no-op"
                );
                return Ok(CaptureReceipt {
                    credited_minutes: existing.minutes,
                    already_captured: true,
                });
            }
        }

        // A gateway failure here is a hard stop: never credit on an
        // unconfirmed provider state.
        let order = self.gateway.get_order(&request.order_id).await?;

        let status = order.status.to_uppercase();
        if status != "COMPLETED" && status != "CAPTURED" {
            return Err(PaymentCaptureError::PaymentNotCompleted(order.status));
        }

        if !order.currency.eq_ignore_ascii_case(&request.currency) {
            return Err(PaymentCaptureError::CurrencyMismatch {
                provider: order.currency,
                expected: request.currency,
            });
        }

        let expected_cents = plan.prices_cents.get(&order.currency.to_uppercase()).copied();
        let Some(expected_cents) = expected_cents else {
            return Err(PaymentCaptureError::CurrencyMismatch {
                provider: order.currency,
                expected: plan
                    .prices_cents
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("/"),
            });
        };
        if order.amount_cents != expected_cents {
            return Err(PaymentCaptureError::AmountMismatch {
                provider_cents: order.amount_cents,
                expected_cents,
            });
        }

        if request.claimed_minutes != plan.minutes
            || request.claimed_amount_cents != order.amount_cents
        {
            tracing::warn!(
                order_id = %request.order_id,
                claimed_minutes = request.claimed_minutes,
                plan_minutes = plan.minutes,
                claimed_amount_cents = request.claimed_amount_cents,
                provider_amount_cents = order.amount_cents,
                "Client-reported capture values disagree with verified order"
            );
        }

        let payment = Payment::captured(
            request.user_id,
            provider.clone(),
            request.order_id.clone(),
            plan.code.clone(),
            plan.minutes,
            order.amount_cents,
            order.currency.to_uppercase(),
            order.raw_payload,
        );

        match self.payments.insert(&payment).await? {
            PaymentInsert::Inserted => {
                tracing::info!(
                    order_id = %request.order_id,
                    plan = %plan.code,
                    minutes = plan.minutes,
                    "Payment captured and credited"
                );
                Ok(CaptureReceipt {
                    credited_minutes: plan.minutes,
                    already_captured: false,
                })
            }
            // Lost a race with a concurrent delivery of the same order;
            // the other writer credited it.
            PaymentInsert::Duplicate => {
                let existing = self
                    .payments
                    .find_by_order(&provider, &request.order_id)
                    .await?;
                let credited = existing.map(|p| p.minutes).unwrap_or(plan.minutes);
                Ok(CaptureReceipt {
                    credited_minutes: credited,
                    already_captured: true,
                })
            }
        }
    }
}

use async_trait::async_trait;

/// Authoritative order record as reported by the payment provider.
/// Client-reported values are never trusted; this is what we verify
/// against.
#[derive(Debug, Clone)]
pub struct ProviderOrder {
    pub order_id: String,
    /// Provider status string, e.g. `COMPLETED`.
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    /// Full provider payload, stored on the Payment row for audit.
    pub raw_payload: serde_json::Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn provider(&self) -> &str;

    async fn get_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentGatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("authentication with provider failed: {0}")]
    AuthFailed(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

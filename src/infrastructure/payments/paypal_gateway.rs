use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{PaymentGateway, PaymentGatewayError, ProviderOrder};

/// PayPal REST adapter: OAuth2 client-credentials token, then
/// `GET /v2/checkout/orders/{id}` for server-side verification. The
/// client's self-reported capture data never reaches this adapter.
pub struct PayPalGateway {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    amount: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct Amount {
    currency_code: String,
    value: String,
}

impl PayPalGateway {
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url,
            client_id,
            client_secret,
        }
    }

    async fn access_token(&self) -> Result<String, PaymentGatewayError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PaymentGatewayError::ApiRequestFailed(format!("token request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentGatewayError::AuthFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentGatewayError::InvalidResponse(format!("token body: {}", e)))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn provider(&self) -> &str {
        "paypal"
    }

    async fn get_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentGatewayError> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders/{}", self.base_url, order_id);

        tracing::debug!(order_id, "Fetching order from PayPal");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::ApiRequestFailed(format!("order request: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentGatewayError::OrderNotFound(order_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentGatewayError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PaymentGatewayError::InvalidResponse(format!("order body: {}", e)))?;
        let order: OrderResponse = serde_json::from_value(raw.clone())
            .map_err(|e| PaymentGatewayError::InvalidResponse(format!("order shape: {}", e)))?;

        let amount = order
            .purchase_units
            .first()
            .and_then(|u| u.amount.as_ref())
            .ok_or_else(|| {
                PaymentGatewayError::InvalidResponse("order has no amount".to_string())
            })?;

        Ok(ProviderOrder {
            order_id: order.id,
            status: order.status,
            amount_cents: parse_decimal_cents(&amount.value)?,
            currency: amount.currency_code.clone(),
            raw_payload: raw,
        })
    }
}

/// Parse a provider decimal string ("9.99") into integer cents without
/// going through floats.
fn parse_decimal_cents(value: &str) -> Result<i64, PaymentGatewayError> {
    let bad = || PaymentGatewayError::InvalidResponse(format!("bad amount: {:?}", value));

    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() || whole.chars().any(|c| !c.is_ascii_digit()) {
        return Err(bad());
    }
    if frac.len() > 2 || frac.chars().any(|c| !c.is_ascii_digit()) {
        return Err(bad());
    }
    let whole: i64 = whole.parse().map_err(|_| bad())?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| bad())? * 10,
        _ => frac.parse().map_err(|_| bad())?,
    };
    Ok(whole * 100 + frac_cents)
}

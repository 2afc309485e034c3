use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::{PaymentGateway, PaymentGatewayError, ProviderOrder};

/// In-memory provider for tests: preloaded orders keyed by id.
pub struct MockPaymentGateway {
    orders: Mutex<HashMap<String, ProviderOrder>>,
    unreachable: Mutex<bool>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(false),
        }
    }

    pub fn add_order(&self, order_id: &str, status: &str, amount_cents: i64, currency: &str) {
        self.orders.lock().unwrap().insert(
            order_id.to_string(),
            ProviderOrder {
                order_id: order_id.to_string(),
                status: status.to_string(),
                amount_cents,
                currency: currency.to_string(),
                raw_payload: json!({ "id": order_id, "status": status }),
            },
        );
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn provider(&self) -> &str {
        "paypal"
    }

    async fn get_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentGatewayError> {
        if *self.unreachable.lock().unwrap() {
            return Err(PaymentGatewayError::ApiRequestFailed(
                "provider unreachable".to_string(),
            ));
        }
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.to_string()))
    }
}

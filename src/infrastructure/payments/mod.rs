mod mock_payment_gateway;
mod paypal_gateway;

pub use mock_payment_gateway::MockPaymentGateway;
pub use paypal_gateway::PayPalGateway;

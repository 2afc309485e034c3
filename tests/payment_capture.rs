use std::collections::HashMap;
use std::sync::Arc;

use polyscribe::application::ports::{PaymentGateway, PaymentRepository};
use polyscribe::application::services::{
    CaptureRequest, PaymentCaptureError, PaymentService, Plan, UsageService,
};
use polyscribe::domain::UserId;
use polyscribe::infrastructure::payments::MockPaymentGateway;
use polyscribe::infrastructure::persistence::repositories::{
    InMemoryJobRepository, InMemoryPaymentRepository,
};

fn starter_plan() -> Plan {
    Plan {
        code: "starter_60".to_string(),
        minutes: 60,
        prices_cents: HashMap::from([("USD".to_string(), 499), ("EUR".to_string(), 459)]),
    }
}

struct Fixture {
    gateway: Arc<MockPaymentGateway>,
    payments: Arc<InMemoryPaymentRepository>,
    service: PaymentService,
}

fn fixture() -> Fixture {
    let gateway = Arc::new(MockPaymentGateway::new());
    let payments = Arc::new(InMemoryPaymentRepository::new());
    let service = PaymentService::new(
        gateway.clone() as Arc<dyn PaymentGateway>,
        payments.clone() as Arc<dyn PaymentRepository>,
        vec![starter_plan()],
    );
    Fixture {
        gateway,
        payments,
        service,
    }
}

fn request(order_id: &str) -> CaptureRequest {
    CaptureRequest {
        user_id: UserId::new("alice"),
        order_id: order_id.to_string(),
        plan_code: "starter_60".to_string(),
        claimed_minutes: 60,
        claimed_amount_cents: 499,
        currency: "USD".to_string(),
    }
}

#[tokio::test]
async fn given_completed_order_when_capturing_then_minutes_are_credited() {
    let f = fixture();
    f.gateway.add_order("ORDER-1", "COMPLETED", 499, "USD");

    let receipt = f.service.capture(request("ORDER-1")).await.unwrap();

    assert_eq!(receipt.credited_minutes, 60);
    assert!(!receipt.already_captured);
    let stored = f
        .payments
        .find_by_order("paypal", "ORDER-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.minutes, 60);
    assert_eq!(stored.amount_cents, 499);
}

#[tokio::test]
async fn given_already_captured_order_when_capturing_again_then_idempotent_no_double_credit() {
    let f = fixture();
    f.gateway.add_order("ORDER-1", "COMPLETED", 499, "USD");

    let first = f.service.capture(request("ORDER-1")).await.unwrap();
    let second = f.service.capture(request("ORDER-1")).await.unwrap();

    assert!(!first.already_captured);
    assert!(second.already_captured);
    assert_eq!(second.credited_minutes, 60);

    let credited = f
        .payments
        .sum_captured_minutes(&UserId::new("alice"))
        .await
        .unwrap();
    assert_eq!(credited, 60);
}

#[tokio::test]
async fn given_pending_order_when_capturing_then_no_credit() {
    let f = fixture();
    f.gateway.add_order("ORDER-1", "PAYER_ACTION_REQUIRED", 499, "USD");

    let result = f.service.capture(request("ORDER-1")).await;

    assert!(matches!(
        result,
        Err(PaymentCaptureError::PaymentNotCompleted(_))
    ));
    assert!(f
        .payments
        .find_by_order("paypal", "ORDER-1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn given_wrong_amount_when_capturing_then_catalog_price_wins() {
    let f = fixture();
    // Provider says 1 cent was captured for a $4.99 plan.
    f.gateway.add_order("ORDER-1", "COMPLETED", 1, "USD");

    let result = f.service.capture(request("ORDER-1")).await;

    match result {
        Err(PaymentCaptureError::AmountMismatch {
            provider_cents,
            expected_cents,
        }) => {
            assert_eq!(provider_cents, 1);
            assert_eq!(expected_cents, 499);
        }
        other => panic!("expected amount mismatch, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn given_currency_mismatch_when_capturing_then_no_credit() {
    let f = fixture();
    f.gateway.add_order("ORDER-1", "COMPLETED", 499, "GBP");

    let result = f.service.capture(request("ORDER-1")).await;

    assert!(matches!(
        result,
        Err(PaymentCaptureError::CurrencyMismatch { .. })
    ));
}

#[tokio::test]
async fn given_unknown_plan_when_capturing_then_rejected_before_provider_lookup() {
    let f = fixture();
    f.gateway.set_unreachable(true);

    let mut req = request("ORDER-1");
    req.plan_code = "gold_9000".to_string();
    let result = f.service.capture(req).await;

    assert!(matches!(result, Err(PaymentCaptureError::UnknownPlan(_))));
}

#[tokio::test]
async fn given_unreachable_provider_when_capturing_then_hard_failure_without_credit() {
    let f = fixture();
    f.gateway.set_unreachable(true);

    let result = f.service.capture(request("ORDER-1")).await;

    assert!(matches!(result, Err(PaymentCaptureError::Gateway(_))));
    assert_eq!(
        f.payments
            .sum_captured_minutes(&UserId::new("alice"))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn given_capture_then_usage_allowance_grows_by_plan_minutes() {
    let f = fixture();
    f.gateway.add_order("ORDER-1", "COMPLETED", 499, "USD");
    let jobs = Arc::new(InMemoryJobRepository::new());
    let usage = UsageService::new(jobs, f.payments.clone(), 10);
    let user = UserId::new("alice");

    let before = usage.balance(&user).await.unwrap().allowance_seconds;
    f.service.capture(request("ORDER-1")).await.unwrap();
    let after = usage.balance(&user).await.unwrap().allowance_seconds;

    assert_eq!(after - before, 60 * 60);
}

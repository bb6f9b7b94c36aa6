use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{
    db_types::OrderStatus,
    traits::TransitionOutcome,
    CheckoutApi,
    CheckoutPolicy,
    GatewayClientError,
};
use serde_json::json;

use super::{
    helpers::post_request,
    mocks::{sample_order, MockGateway, MockOrderDb, TEST_ORDER_ID},
};
use crate::routes::PaymentNotificationRoute;

fn settlement_payload() -> serde_json::Value {
    json!({"order_id": TEST_ORDER_ID, "transaction_status": "settlement", "status_code": "200"})
}

fn unverified_policy() -> CheckoutPolicy {
    CheckoutPolicy { verify_notifications: false, ..Default::default() }
}

#[actix_web::test]
async fn settlement_notification_completes_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/notifications", settlement_payload(), configure_pending_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["applied"], true);
}

#[actix_web::test]
async fn redelivered_notification_is_acknowledged_without_writes() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/notifications", settlement_payload(), configure_completed_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["applied"], false);
}

#[actix_web::test]
async fn notification_without_mandatory_fields_is_rejected() {
    let _ = env_logger::try_init().ok();
    let payload = json!({"transaction_status": "settlement"});
    let (status, body) = post_request("/notifications", payload, configure_unused).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "INVALID_NOTIFICATION");
}

#[actix_web::test]
async fn notification_for_unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/notifications", settlement_payload(), configure_unknown_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "ORDER_NOT_FOUND");
}

#[actix_web::test]
async fn unverifiable_notification_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/notifications", settlement_payload(), configure_failing_verification).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "VERIFICATION_FAILED");
}

fn configure_pending_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Pending))));
    db.expect_apply_transition()
        .returning(|_| Ok(TransitionOutcome { applied: true, order: sample_order(OrderStatus::Completed) }));
    let api = CheckoutApi::new(db, MockGateway::new(), unverified_policy());
    cfg.app_data(web::Data::new(api)).service(PaymentNotificationRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_completed_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Completed))));
    // No apply_transition expectation: a replay must not write anything.
    let api = CheckoutApi::new(db, MockGateway::new(), unverified_policy());
    cfg.app_data(web::Data::new(api)).service(PaymentNotificationRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_unused(cfg: &mut ServiceConfig) {
    let api = CheckoutApi::new(MockOrderDb::new(), MockGateway::new(), unverified_policy());
    cfg.app_data(web::Data::new(api)).service(PaymentNotificationRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    let api = CheckoutApi::new(db, MockGateway::new(), unverified_policy());
    cfg.app_data(web::Data::new(api)).service(PaymentNotificationRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_failing_verification(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_notification()
        .returning(|_| Err(GatewayClientError::VerificationFailed("signature mismatch".to_string())));
    // No store expectations: verification failures must reject before any state is touched.
    let policy = CheckoutPolicy { verify_notifications: true, ..Default::default() };
    let api = CheckoutApi::new(MockOrderDb::new(), gateway, policy);
    cfg.app_data(web::Data::new(api)).service(PaymentNotificationRoute::<MockOrderDb, MockGateway>::new());
}

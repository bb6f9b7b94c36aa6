use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{
    db_types::{OrderId, OrderStatus},
    traits::{GatewayStatus, TransitionOutcome},
    CheckoutApi,
    CheckoutPolicy,
    GatewayClientError,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::get_request,
    mocks::{sample_order, MockGateway, MockOrderDb, TEST_ORDER_ID},
};
use crate::routes::PaymentStatusRoute;

fn status_path() -> String {
    format!("/{TEST_ORDER_ID}/status")
}

fn gateway_status(transaction_status: &str) -> GatewayStatus {
    GatewayStatus {
        order_id: OrderId(TEST_ORDER_ID.to_string()),
        transaction_status: transaction_status.to_string(),
        fraud_status: None,
        raw: json!({"order_id": TEST_ORDER_ID, "transaction_status": transaction_status}),
    }
}

#[actix_web::test]
async fn fresh_settled_order_is_served_from_cache() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&status_path(), configure_cached).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["fromCache"], true);
}

#[actix_web::test]
async fn force_check_bypasses_the_cache() {
    let _ = env_logger::try_init().ok();
    let path = format!("{}?forceCheck=true", status_path());
    let (status, body) = get_request(&path, configure_force_poll).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["fromCache"], false);
}

#[actix_web::test]
async fn pending_order_polls_and_reconciles() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&status_path(), configure_settling_poll).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["fromCache"], false);
}

#[actix_web::test]
async fn lost_reconciliation_race_reports_the_stored_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&status_path(), configure_lost_race).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    // The gateway said settlement, but a concurrent writer moved the order to failed first.
    assert_eq!(body["status"], "failed");
    assert_eq!(body["order"]["status"], "failed");
    assert_eq!(body["fromCache"], false);
}

#[actix_web::test]
async fn gateway_outage_degrades_to_stored_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&status_path(), configure_gateway_down).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["fromCache"], true);
    assert!(body["advisory"].is_string());
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&status_path(), configure_unknown_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "ORDER_NOT_FOUND");
}

fn register(cfg: &mut ServiceConfig, db: MockOrderDb, gateway: MockGateway) {
    let api = CheckoutApi::new(db, gateway, CheckoutPolicy::default());
    cfg.app_data(web::Data::new(api)).service(PaymentStatusRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_cached(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| {
        let mut order = sample_order(OrderStatus::Completed);
        order.last_checked = Some(Utc::now());
        Ok(Some(order))
    });
    register(cfg, db, MockGateway::new());
}

fn configure_force_poll(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| {
        let mut order = sample_order(OrderStatus::Completed);
        order.last_checked = Some(Utc::now());
        Ok(Some(order))
    });
    db.expect_touch_last_checked().returning(|_| Ok(()));
    let mut gateway = MockGateway::new();
    gateway.expect_transaction_status().returning(|_| Ok(gateway_status("settlement")));
    register(cfg, db, gateway);
}

fn configure_settling_poll(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    let mut calls = 0;
    db.expect_fetch_order().returning(move |_| {
        // Pending for the status-check and reconciliation reads, completed on the refetch.
        calls += 1;
        let status = if calls <= 2 { OrderStatus::Pending } else { OrderStatus::Completed };
        Ok(Some(sample_order(status)))
    });
    db.expect_apply_transition()
        .returning(|_| Ok(TransitionOutcome { applied: true, order: sample_order(OrderStatus::Completed) }));
    db.expect_touch_last_checked().returning(|_| Ok(()));
    let mut gateway = MockGateway::new();
    gateway.expect_transaction_status().returning(|_| Ok(gateway_status("settlement")));
    register(cfg, db, gateway);
}

fn configure_lost_race(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    let mut calls = 0;
    db.expect_fetch_order().returning(move |_| {
        // Pending for the status-check and reconciliation reads; the refetch sees the racing
        // writer's failed status.
        calls += 1;
        let status = if calls <= 2 { OrderStatus::Pending } else { OrderStatus::Failed };
        Ok(Some(sample_order(status)))
    });
    db.expect_apply_transition()
        .returning(|_| Ok(TransitionOutcome { applied: false, order: sample_order(OrderStatus::Failed) }));
    db.expect_touch_last_checked().returning(|_| Ok(()));
    let mut gateway = MockGateway::new();
    gateway.expect_transaction_status().returning(|_| Ok(gateway_status("settlement")));
    register(cfg, db, gateway);
}

fn configure_gateway_down(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Pending))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_transaction_status()
        .returning(|_| Err(GatewayClientError::RequestError("connection refused".to_string())));
    register(cfg, db, gateway);
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    register(cfg, db, MockGateway::new());
}

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{db_types::OrderStatus, CheckoutApi, CheckoutPolicy};

use super::{
    helpers::get_request,
    mocks::{sample_fulfillment, sample_history_entry, sample_order, MockGateway, MockOrderDb, TEST_ORDER_ID},
};
use crate::routes::{OrderAuditRoute, OrderByIdRoute, OrdersRoute};

#[actix_web::test]
async fn order_list_is_returned() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders", configure_list).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn list_filters_are_passed_to_the_store() {
    let _ = env_logger::try_init().ok();
    let path = "/orders?status=completed&limit=5&since=2026-08-01T00:00:00Z";
    let (status, body) = get_request(path, configure_filtered_list).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn order_detail_is_returned() {
    let _ = env_logger::try_init().ok();
    let path = format!("/orders/{TEST_ORDER_ID}");
    let (status, body) = get_request(&path, configure_detail).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["orderId"], TEST_ORDER_ID);
    assert_eq!(body["order"]["status"], "completed");
}

#[actix_web::test]
async fn unknown_order_detail_is_not_found() {
    let _ = env_logger::try_init().ok();
    let path = format!("/orders/{TEST_ORDER_ID}");
    let (status, body) = get_request(&path, configure_unknown).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "ORDER_NOT_FOUND");
}

#[actix_web::test]
async fn order_audit_carries_history_and_fulfillment() {
    let _ = env_logger::try_init().ok();
    let path = format!("/orders/{TEST_ORDER_ID}/audit");
    let (status, body) = get_request(&path, configure_audit).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["order"]["orderId"], TEST_ORDER_ID);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["entryType"], "notification");
    assert_eq!(history[0]["previousStatus"], "pending");
    assert_eq!(body["fulfillment"]["status"], "pending_fulfillment");
}

#[actix_web::test]
async fn audit_for_unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let path = format!("/orders/{TEST_ORDER_ID}/audit");
    let (status, body) = get_request(&path, configure_unknown).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "ORDER_NOT_FOUND");
}

// Mirrors the server's /orders scope so that route precedence is exercised too.
fn register(cfg: &mut ServiceConfig, db: MockOrderDb) {
    let api = CheckoutApi::new(db, MockGateway::new(), CheckoutPolicy::default());
    let scope = web::scope("/orders")
        .service(OrderAuditRoute::<MockOrderDb, MockGateway>::new())
        .service(OrderByIdRoute::<MockOrderDb, MockGateway>::new())
        .service(OrdersRoute::<MockOrderDb, MockGateway>::new());
    cfg.app_data(web::Data::new(api)).service(scope);
}

fn configure_list(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_search_orders()
        .returning(|_| Ok(vec![sample_order(OrderStatus::Pending), sample_order(OrderStatus::Completed)]));
    register(cfg, db);
}

fn configure_filtered_list(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_search_orders()
        .withf(|filter| {
            filter.status == Some(OrderStatus::Completed) && filter.limit == Some(5) && filter.since.is_some()
        })
        .returning(|_| Ok(vec![]));
    register(cfg, db);
}

fn configure_detail(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Completed))));
    register(cfg, db);
}

fn configure_unknown(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    register(cfg, db);
}

fn configure_audit(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Completed))));
    db.expect_fetch_history()
        .returning(|_| Ok(vec![sample_history_entry("notification", OrderStatus::Completed)]));
    db.expect_fetch_fulfillment().returning(|_| Ok(Some(sample_fulfillment())));
    register(cfg, db);
}

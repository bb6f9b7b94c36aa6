use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{
    db_types::OrderStatus,
    traits::PaymentSession,
    CheckoutApi,
    CheckoutPolicy,
    GatewayClientError,
};
use serde_json::json;

use super::{
    helpers::post_request,
    mocks::{checkout_body, sample_order, MockGateway, MockOrderDb, TEST_ORDER_ID},
};
use crate::routes::CreateTransactionRoute;

#[actix_web::test]
async fn create_transaction_returns_session() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/transactions", checkout_body(), configure_happy).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["orderId"], TEST_ORDER_ID);
    assert_eq!(body["token"], "token-42");
}

#[actix_web::test]
async fn create_transaction_without_details_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/transactions", json!({"payment_type": "qris"}), configure_unused).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("customer_details"));
    assert!(message.contains("item_details"));
    assert!(message.contains("transaction_details"));
}

#[actix_web::test]
async fn gateway_rejection_maps_to_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/transactions", checkout_body(), configure_gateway_down).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "TRANSACTION_CREATION_FAILED");
}

fn configure_happy(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(OrderStatus::Pending)));
    db.expect_attach_payment_session().returning(|_, _, _| Ok(sample_order(OrderStatus::Pending)));
    let mut gateway = MockGateway::new();
    gateway.expect_create_transaction().returning(|_| {
        Ok(PaymentSession {
            token: Some("token-42".to_string()),
            redirect_url: Some("https://gateway.test/redirect/token-42".to_string()),
            raw: json!({"token": "token-42"}),
        })
    });
    let api = CheckoutApi::new(db, gateway, CheckoutPolicy::default());
    cfg.app_data(web::Data::new(api)).service(CreateTransactionRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_unused(cfg: &mut ServiceConfig) {
    let api = CheckoutApi::new(MockOrderDb::new(), MockGateway::new(), CheckoutPolicy::default());
    cfg.app_data(web::Data::new(api)).service(CreateTransactionRoute::<MockOrderDb, MockGateway>::new());
}

fn configure_gateway_down(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(OrderStatus::Pending)));
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_transaction()
        .returning(|_| Err(GatewayClientError::ResponseError { status: 500, message: "gateway down".to_string() }));
    let api = CheckoutApi::new(db, gateway, CheckoutPolicy::default());
    cfg.app_data(web::Data::new(api)).service(CreateTransactionRoute::<MockOrderDb, MockGateway>::new());
}

use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{GatewayClientError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Missing required fields: {}", .0.join(", "))]
    ValidationError(Vec<String>),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("An order with id {0} already exists")]
    OrderAlreadyExists(OrderId),
    #[error("Invalid notification. {0}")]
    InvalidNotification(String),
    #[error("Notification verification failed. {0}")]
    VerificationFailed(String),
    #[error("Transaction creation failed for order {order_id}. {message}")]
    TransactionCreationFailed { order_id: OrderId, message: String },
    #[error("Payment gateway error. {0}")]
    UpstreamGateway(#[from] GatewayClientError),
    #[error("Order store error. {0}")]
    StoreError(String),
}

impl From<OrderStoreError> for CheckoutError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => CheckoutError::OrderNotFound(id),
            OrderStoreError::OrderAlreadyExists(id) => CheckoutError::OrderAlreadyExists(id),
            OrderStoreError::DatabaseError(msg) => CheckoutError::StoreError(msg),
        }
    }
}

use serde_json::Value;
use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::data_objects::{ChargeRequest, GatewayStatus, PaymentSession},
};

/// The seam to the external payment processor.
///
/// All methods hit the network; none of them mutate local state. Failures are transient from the caller's point
/// of view: nothing here is retried automatically (the gateway re-delivers webhooks, and status checks degrade to
/// cached data).
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayClient: Clone {
    /// Create a payment session (transaction) for a new order.
    async fn create_transaction(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayClientError>;

    /// Query the live transaction status for an order.
    async fn transaction_status(&self, order_id: &OrderId) -> Result<GatewayStatus, GatewayClientError>;

    /// Verify an inbound webhook notification, returning the authoritative payload.
    ///
    /// Implementations re-fetch the transaction from the gateway rather than trusting the inbound body; a payload
    /// that fails its signature check or names a transaction the gateway does not know fails with
    /// [`GatewayClientError::VerificationFailed`].
    async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, GatewayClientError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayClientError {
    #[error("Could not initialize the gateway client. {0}")]
    Initialization(String),
    #[error("Error sending request to the payment gateway. {0}")]
    RequestError(String),
    #[error("The payment gateway returned an error. {status}: {message}")]
    ResponseError { status: u16, message: String },
    #[error("Could not deserialize the gateway response. {0}")]
    JsonError(String),
    #[error("Notification verification failed. {0}")]
    VerificationFailed(String),
}

//! The collaborator interfaces consumed by the checkout flows.
//!
//! Two seams exist: the [`OrderStore`] (persistence) and the [`PaymentGatewayClient`] (the external payment
//! processor). Concrete backends implement these traits; the flows in [`crate::api`] are generic over them so that
//! tests can substitute doubles.

pub mod data_objects;
mod order_store;
mod payment_gateway_client;

pub use data_objects::{
    ChargeRequest,
    GatewayStatus,
    LineItem,
    OrderQueryFilter,
    PaymentSession,
    StatusTransition,
    TransactionDetails,
    TransitionOutcome,
};
pub use order_store::{OrderStore, OrderStoreError};
pub use payment_gateway_client::{GatewayClientError, PaymentGatewayClient};

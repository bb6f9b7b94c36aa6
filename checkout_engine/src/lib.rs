//! Checkout Payment Engine
//!
//! This library contains the core logic for the checkout and payment-status service. It is gateway-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@api`]). This provides the public-facing functionality of the engine: creating
//!    checkout transactions, checking payment status, and reconciling webhook notifications. Specific persistence
//!    backends and payment gateways implement the traits in [`mod@traits`] in order to plug into the engine.

pub mod db_types;
pub mod helpers;
pub mod status_mapper;
pub mod traits;

mod api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "test_utils")]
pub mod test_utils;

pub use api::{
    CheckoutApi,
    CheckoutError,
    CheckoutOutcome,
    CheckoutPolicy,
    CheckoutRequest,
    NotificationOutcome,
    OrderAudit,
    ReconcileOutcome,
    Reconciler,
    StatusCheckResult,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderStore;
pub use traits::{GatewayClientError, OrderStore, OrderStoreError, PaymentGatewayClient};

//! The public flow APIs of the checkout engine.
//!
//! [`Reconciler`] applies one observed status event to one order, exactly once and atomically.
//! [`CheckoutApi`] composes the order store and the payment gateway client into the three request-level flows:
//! transaction creation, status checking (with its read-through cache) and webhook notification handling.

pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod reconciler;

pub use checkout_api::{CheckoutApi, CheckoutPolicy};
pub use checkout_objects::{CheckoutOutcome, CheckoutRequest, NotificationOutcome, OrderAudit, StatusCheckResult};
pub use errors::CheckoutError;
pub use reconciler::{ReconcileOutcome, Reconciler};

//! A client for the Snap payment gateway's REST APIs.
//!
//! [`SnapApi`] implements the engine's [`checkout_engine::PaymentGatewayClient`] trait: it creates payment
//! sessions on the Snap endpoint, polls transaction status on the core API, and verifies webhook notifications
//! by checking the payload signature and then re-fetching the transaction from the gateway rather than trusting
//! the inbound body.

mod api;
mod config;
pub mod signature;

pub use api::SnapApi;
pub use config::{SnapConfig, SnapEnvironment};

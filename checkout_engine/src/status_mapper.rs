//! The mapping from gateway-reported transaction states to canonical order statuses.
//!
//! This is the single place where gateway vocabulary is translated into domain vocabulary. The mapping is total:
//! unknown gateway statuses pass through lowercased instead of failing, so a gateway rollout of a new status does
//! not take the webhook endpoint down.

use crate::db_types::OrderStatus;

/// Map a `(transaction_status, fraud_status)` pair to a domain order status.
///
/// `capture` is the only status that consults the fraud verdict: an explicit `accept` completes the order, a
/// `challenge` keeps it pending, and `deny` fails it. An unrecognized fraud verdict on a capture maps to
/// `Pending`, since an order is never marked paid without an explicit accept.
pub fn map_status(transaction_status: &str, fraud_status: Option<&str>) -> OrderStatus {
    match transaction_status {
        "capture" => match fraud_status {
            Some("accept") => OrderStatus::Completed,
            Some("deny") => OrderStatus::Failed,
            _ => OrderStatus::Pending,
        },
        "settlement" => OrderStatus::Completed,
        "pending" => OrderStatus::Pending,
        "deny" | "cancel" | "expire" => OrderStatus::Failed,
        "refund" => OrderStatus::Refunded,
        "partial_refund" => OrderStatus::PartiallyRefunded,
        other => OrderStatus::Other(other.to_lowercase()),
    }
}

use chrono::{DateTime, Utc};
use cps_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db_types::{HistoryType, Order, OrderId, OrderStatus};

//--------------------------------------    TransactionDetails  ------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub gross_amount: Money,
}

//--------------------------------------        LineItem        ------------------------------------------------------
/// One item in the checkout request. Unknown fields are carried through so that the stored snapshot retains
/// whatever the storefront sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub price: Money,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    pub fn total_price(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------      ChargeRequest     ------------------------------------------------------
/// The validated request passed to the payment gateway to create a payment session.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub transaction_details: TransactionDetails,
    pub customer_details: Value,
    pub item_details: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
}

//--------------------------------------     PaymentSession     ------------------------------------------------------
/// The gateway's response to a transaction creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// The full response payload, stored verbatim for audit.
    pub raw: Value,
}

//--------------------------------------      GatewayStatus     ------------------------------------------------------
/// A transaction status as reported by the gateway, either from a status poll or a verified notification.
#[derive(Debug, Clone)]
pub struct GatewayStatus {
    pub order_id: OrderId,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    /// The full payload, stored verbatim for audit.
    pub raw: Value,
}

impl GatewayStatus {
    /// Build a status from a raw gateway payload. Returns `None` when the payload lacks the mandatory
    /// `order_id`/`transaction_status` pair.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let order_id = payload.get("order_id")?.as_str()?;
        let transaction_status = payload.get("transaction_status")?.as_str()?;
        let fraud_status = payload.get("fraud_status").and_then(|v| v.as_str()).map(String::from);
        Some(Self {
            order_id: OrderId(order_id.to_string()),
            transaction_status: transaction_status.to_string(),
            fraud_status,
            raw: payload.clone(),
        })
    }
}

//--------------------------------------    StatusTransition    ------------------------------------------------------
/// One status transition to be applied atomically by the order store.
///
/// `expected_from` is the status the caller observed when deciding to transition; the store only applies the
/// write if the order still carries that status (conditional write).
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub order_id: OrderId,
    pub expected_from: OrderStatus,
    pub to: OrderStatus,
    pub entry_type: HistoryType,
    pub source: String,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// False when the conditional write found the order no longer in `expected_from` (a concurrent
    /// reconciliation won the race, or the transition had already been applied).
    pub applied: bool,
    pub order: Order,
}

//--------------------------------------    OrderQueryFilter    ------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.since.is_none() && self.until.is_none()
    }
}

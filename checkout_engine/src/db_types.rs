use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cps_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
// Json-typed columns appear in the public row types, so re-export the wrapper for downstream crates.
pub use sqlx::types::Json;
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------
/// The canonical domain status of an order.
///
/// Statuses are stored and transmitted as lowercase strings. Gateway statuses that have no mapping are carried
/// through verbatim (lowercased) in the `Other` variant rather than rejected, so that new gateway statuses do not
/// break notification handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// The order exists, but payment has not been confirmed yet.
    Pending,
    /// Payment has been received in full.
    Completed,
    /// The payment was denied, cancelled or expired.
    Failed,
    /// The payment was refunded in full.
    Refunded,
    /// The payment was partially refunded.
    PartiallyRefunded,
    /// A gateway status with no canonical mapping, carried through as-is.
    Other(String),
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Failed => write!(f, "failed"),
            OrderStatus::Refunded => write!(f, "refunded"),
            OrderStatus::PartiallyRefunded => write!(f, "partially_refunded"),
            OrderStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            "partially_refunded" => Self::PartiallyRefunded,
            other => Self::Other(other.to_lowercase()),
        };
        Ok(status)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(OrderStatus::Pending)
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.to_string()
    }
}

//--------------------------------------      HistoryType      -------------------------------------------------------
/// The kind of event that produced a status history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryType {
    /// Written once, when the payment session is first created for the order.
    Initial,
    /// Written when a gateway webhook notification is applied.
    Notification,
    /// Written when a live status poll observed a transition.
    StatusCheck,
}

impl Display for HistoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryType::Initial => write!(f, "initial"),
            HistoryType::Notification => write!(f, "notification"),
            HistoryType::StatusCheck => write!(f, "status_check"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid history entry type: {0}")]
pub struct ConversionError(String);

impl FromStr for HistoryType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "notification" => Ok(Self::Notification),
            "status_check" => Ok(Self::StatusCheck),
            s => Err(ConversionError(format!("Invalid history entry type: {s}"))),
        }
    }
}

impl From<String> for HistoryType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid history type: {value}. But this conversion cannot fail. Defaulting to StatusCheck");
            HistoryType::StatusCheck
        })
    }
}

impl From<HistoryType> for String {
    fn from(value: HistoryType) -> Self {
        value.to_string()
    }
}

//--------------------------------------        Order          -------------------------------------------------------
/// The central order record.
///
/// After any reconciliation write, `status`, `payment_status` and `gateway_status` always agree; the store updates
/// them in a single statement.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// Denormalized snapshot of the customer details supplied at creation time. Immutable.
    pub customer: Json<Value>,
    /// Line items (excluding the shipping pseudo-item), each with a computed `total_price`. Immutable.
    pub items: Json<Value>,
    /// Shipping fee and address snapshot. Immutable.
    pub shipping: Json<Value>,
    pub payment_method: String,
    pub amount: Money,
    #[sqlx(try_from = "String")]
    pub payment_status: OrderStatus,
    /// Set exactly once, on the first transition into `completed`.
    pub paid_at: Option<DateTime<Utc>>,
    /// Timestamp of the last live status poll against the gateway.
    pub last_checked: Option<DateTime<Utc>>,
    /// The raw gateway response to the payment session creation call.
    pub payment_data: Option<Json<Value>>,
    /// The order id as known by the gateway. May differ from `order_id` in principle; today they are equal.
    pub gateway_order_id: OrderId,
    #[sqlx(try_from = "String")]
    pub gateway_status: OrderStatus,
    /// The last verified webhook payload applied to this order.
    pub last_notification: Option<Json<Value>>,
    /// The last raw status-poll response that caused a transition.
    pub last_response: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer: Value,
    pub items: Value,
    pub shipping: Value,
    pub payment_method: String,
    pub amount: Money,
}

impl NewOrder {
    pub fn new(order_id: OrderId, amount: Money) -> Self {
        Self {
            order_id,
            customer: Value::Object(Default::default()),
            items: Value::Array(Default::default()),
            shipping: Value::Object(Default::default()),
            payment_method: "unknown".to_string(),
            amount,
        }
    }

    pub fn with_payment_method<S: Into<String>>(mut self, method: S) -> Self {
        self.payment_method = method.into();
        self
    }
}

//--------------------------------------   StatusHistoryEntry  -------------------------------------------------------
/// An append-only audit record of one observed status event. Never read by decision logic.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub order_id: OrderId,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[sqlx(try_from = "String")]
    pub entry_type: HistoryType,
    pub source: String,
    pub previous_status: Option<String>,
    pub payload: Json<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub status: OrderStatus,
    pub entry_type: HistoryType,
    pub source: String,
    pub previous_status: Option<OrderStatus>,
    pub payload: Value,
}

//--------------------------------------   FulfillmentRecord   -------------------------------------------------------
/// Created at most once per order, on the first transition into `completed`. Consumed by downstream fulfillment
/// systems; this service only ever inserts it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRecord {
    pub id: i64,
    pub order_id: OrderId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::errors::CheckoutError,
    db_types::{FulfillmentRecord, Order, OrderId, OrderStatus, StatusHistoryEntry},
    traits::{LineItem, PaymentSession, TransactionDetails},
};

//--------------------------------------    CheckoutRequest     ------------------------------------------------------
/// The inbound create-transaction request, deserialized at the boundary before any logic runs.
///
/// The three detail groups are optional at the type level so that validation can report every missing group at
/// once instead of failing on the first.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_details: Option<Value>,
    #[serde(default)]
    pub item_details: Option<Vec<LineItem>>,
    #[serde(default)]
    pub transaction_details: Option<TransactionDetails>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

impl CheckoutRequest {
    /// Validate presence of all three detail groups, listing every missing one.
    pub fn validate(self) -> Result<(Value, Vec<LineItem>, TransactionDetails, Option<String>), CheckoutError> {
        let mut missing = Vec::new();
        if self.customer_details.is_none() {
            missing.push("customer_details".to_string());
        }
        if self.item_details.is_none() {
            missing.push("item_details".to_string());
        }
        if self.transaction_details.is_none() {
            missing.push("transaction_details".to_string());
        }
        match (self.customer_details, self.item_details, self.transaction_details) {
            (Some(c), Some(i), Some(t)) => Ok((c, i, t, self.payment_type)),
            _ => Err(CheckoutError::ValidationError(missing)),
        }
    }
}

//--------------------------------------    CheckoutOutcome     ------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub payment_session: PaymentSession,
    pub order: Order,
}

//--------------------------------------   StatusCheckResult    ------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct StatusCheckResult {
    pub status: OrderStatus,
    pub from_cache: bool,
    /// Set when the upstream poll failed and the result was served from stored data instead.
    pub advisory: Option<String>,
    pub order: Order,
}

//--------------------------------------  NotificationOutcome   ------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOutcome {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// False when the notification was a replay of an already-applied status.
    pub applied: bool,
}

//--------------------------------------      OrderAudit        ------------------------------------------------------
/// An order with its full audit trail, for debug inspection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAudit {
    pub order: Order,
    pub history: Vec<StatusHistoryEntry>,
    pub fulfillment: Option<FulfillmentRecord>,
}

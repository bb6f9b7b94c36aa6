//! Small pure helpers used by the checkout flows.

use chrono::Utc;
use cps_common::Money;
use rand::Rng;
use serde_json::{json, Value};

use crate::{db_types::OrderId, traits::LineItem};

/// The reserved item id that storefronts use to send the shipping fee as a pseudo line item.
pub const SHIPPING_ITEM_ID: &str = "SHIPPING";

/// Generate an order id of the form `ORDER-<epoch millis>-<3-digit random>`.
///
/// This scheme matches the ids already in circulation. It is not collision-free under load (two requests in the
/// same millisecond can draw the same suffix); swap in a UUID here if the id format ever stops being a
/// compatibility constraint.
pub fn generate_order_id() -> OrderId {
    let millis = Utc::now().timestamp_millis();
    let suffix = rand::thread_rng().gen_range(0..1000u32);
    OrderId(format!("ORDER-{millis}-{suffix:03}"))
}

/// The shipping fee carried by the `SHIPPING` pseudo-item, or zero when absent.
pub fn shipping_fee(items: &[LineItem]) -> Money {
    items.iter().find(|i| i.id == SHIPPING_ITEM_ID).map(|i| i.price).unwrap_or_default()
}

/// The item snapshot stored on the order: every real line item (the shipping pseudo-item excluded) with its
/// computed `total_price`.
pub fn line_items_snapshot(items: &[LineItem]) -> Value {
    let snapshot = items
        .iter()
        .filter(|i| i.id != SHIPPING_ITEM_ID)
        .map(|item| {
            let mut value = serde_json::to_value(item).unwrap_or_else(|_| json!({}));
            if let Some(obj) = value.as_object_mut() {
                obj.insert("total_price".to_string(), json!(item.total_price().value()));
            }
            value
        })
        .collect();
    Value::Array(snapshot)
}

/// The customer snapshot stored on the order: the request's customer details plus a derived `full_name`.
pub fn customer_snapshot(customer_details: &Value) -> Value {
    let mut snapshot = customer_details.clone();
    if let Some(obj) = snapshot.as_object_mut() {
        let first = obj.get("first_name").and_then(|v| v.as_str()).unwrap_or_default();
        let last = obj.get("last_name").and_then(|v| v.as_str()).unwrap_or_default();
        let full_name = format!("{first} {last}").trim().to_string();
        if !full_name.is_empty() {
            obj.insert("full_name".to_string(), json!(full_name));
        }
    }
    snapshot
}

/// The shipping snapshot stored on the order: the fee plus the customer's shipping address, when present.
pub fn shipping_snapshot(items: &[LineItem], customer_details: &Value) -> Value {
    json!({
        "fee": shipping_fee(items).value(),
        "address": customer_details.get("shipping_address").cloned().unwrap_or(Value::Null),
    })
}

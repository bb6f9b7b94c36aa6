use serde_json::Value;
use thiserror::Error;

use crate::{
    db_types::{FulfillmentRecord, NewHistoryEntry, NewOrder, Order, OrderId, StatusHistoryEntry},
    traits::data_objects::{OrderQueryFilter, StatusTransition, TransitionOutcome},
};

/// The persistence seam for orders, their append-only status history and fulfillment records.
///
/// The consistency contract is narrow and matters a great deal:
/// * [`Self::apply_transition`] is the only way to change an order's status. The status fields, the history
///   entry, `paid_at` and the fulfillment record all commit together or not at all.
/// * The status write inside [`Self::apply_transition`] is conditional on the expected previous status, so racing
///   writers cannot both apply the same transition.
/// * Status history is append-only; nothing in this trait mutates or deletes an entry.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// The URL of the underlying database.
    fn url(&self) -> &str;

    /// Persist a brand-new order. Fails with [`OrderStoreError::OrderAlreadyExists`] if the order id is taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetch an order by its public order id.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Fetch orders matching the filter, most recent first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;

    /// Record the gateway's payment-session payload on the order and append the `initial` history entry, in one
    /// atomic unit.
    async fn attach_payment_session(
        &self,
        order_id: &OrderId,
        session: Value,
        entry: NewHistoryEntry,
    ) -> Result<Order, OrderStoreError>;

    /// Atomically apply a status transition: update the status fields (and `paid_at` on a first completion),
    /// append one history entry, and create the fulfillment record when the order completes.
    ///
    /// Returns `applied = false` without any write if the order is no longer in the expected previous status.
    async fn apply_transition(&self, transition: StatusTransition) -> Result<TransitionOutcome, OrderStoreError>;

    /// Append a history entry outside of a transition (audit-only writes).
    async fn append_history(&self, order_id: &OrderId, entry: NewHistoryEntry)
        -> Result<StatusHistoryEntry, OrderStoreError>;

    /// Record that a live status poll happened now, regardless of whether it changed anything.
    async fn touch_last_checked(&self, order_id: &OrderId) -> Result<(), OrderStoreError>;

    /// The full status history for an order, in insertion order.
    async fn fetch_history(&self, order_id: &OrderId) -> Result<Vec<StatusHistoryEntry>, OrderStoreError>;

    /// The fulfillment record for an order, if it has completed.
    async fn fetch_fulfillment(&self, order_id: &OrderId) -> Result<Option<FulfillmentRecord>, OrderStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

use log::debug;
use serde_json::Value;
use sqlx::{types::Json, SqlitePool};

use crate::{
    db_types::{FulfillmentRecord, NewHistoryEntry, NewOrder, Order, OrderId, OrderStatus, StatusHistoryEntry},
    sqlite::db::{fulfillment, new_pool, orders, status_history},
    traits::{OrderQueryFilter, OrderStore, OrderStoreError, StatusTransition, TransitionOutcome},
};

#[derive(Clone)]
pub struct SqliteOrderStore {
    url: String,
    pool: SqlitePool,
    #[cfg(feature = "test_utils")]
    fail_before_commit: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl std::fmt::Debug for SqliteOrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteOrderStore ({})", self.url)
    }
}

impl SqliteOrderStore {
    pub async fn new(url: &str) -> Result<Self, OrderStoreError> {
        let pool = new_pool(url, 25).await?;
        Ok(Self {
            url: url.to_string(),
            pool,
            #[cfg(feature = "test_utils")]
            fail_before_commit: Default::default(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Arranges for the next `apply_transition` call to fail just before its commit, so tests can check that
    /// a failed transaction leaves no partial writes behind.
    #[cfg(feature = "test_utils")]
    pub fn inject_commit_failure(&self) {
        self.fail_before_commit.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl OrderStore for SqliteOrderStore {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} inserted with status {}", order.order_id, order.status);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn attach_payment_session(
        &self,
        order_id: &OrderId,
        session: Value,
        entry: NewHistoryEntry,
    ) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::attach_payment_session(order_id, Json(session), &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        status_history::insert_entry(order_id, entry, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payment session attached to order {}", order.order_id);
        Ok(order)
    }

    async fn apply_transition(&self, transition: StatusTransition) -> Result<TransitionOutcome, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::conditional_status_update(&transition, &mut tx).await? else {
            tx.rollback().await?;
            let order = self
                .fetch_order(&transition.order_id)
                .await?
                .ok_or_else(|| OrderStoreError::OrderNotFound(transition.order_id.clone()))?;
            debug!(
                "🗃️ Conditional write for order {} missed. Expected {}, found {}",
                transition.order_id, transition.expected_from, order.status
            );
            return Ok(TransitionOutcome { applied: false, order });
        };
        let entry = NewHistoryEntry {
            status: transition.to.clone(),
            entry_type: transition.entry_type,
            source: transition.source.clone(),
            previous_status: Some(transition.expected_from.clone()),
            payload: transition.payload.clone(),
        };
        status_history::insert_entry(&transition.order_id, entry, &mut tx).await?;
        if transition.to == OrderStatus::Completed {
            let created = fulfillment::create_if_absent(&transition.order_id, &mut tx).await?;
            if created {
                debug!("🗃️ Fulfillment record created for order {}", transition.order_id);
            }
        }
        #[cfg(feature = "test_utils")]
        if self.fail_before_commit.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Err(OrderStoreError::DatabaseError("injected write failure".to_string()));
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order {} transitioned from {} to {}",
            transition.order_id, transition.expected_from, transition.to
        );
        Ok(TransitionOutcome { applied: true, order })
    }

    async fn append_history(
        &self,
        order_id: &OrderId,
        entry: NewHistoryEntry,
    ) -> Result<StatusHistoryEntry, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let entry = status_history::insert_entry(order_id, entry, &mut conn).await?;
        Ok(entry)
    }

    async fn touch_last_checked(&self, order_id: &OrderId) -> Result<(), OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::touch_last_checked(order_id, &mut conn).await?;
        Ok(())
    }

    async fn fetch_history(&self, order_id: &OrderId) -> Result<Vec<StatusHistoryEntry>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let entries = status_history::fetch_entries(order_id, &mut conn).await?;
        Ok(entries)
    }

    async fn fetch_fulfillment(&self, order_id: &OrderId) -> Result<Option<FulfillmentRecord>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let record = fulfillment::fetch_record(order_id, &mut conn).await?;
        Ok(record)
    }
}

use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    api::errors::CheckoutError,
    db_types::{HistoryType, Order, OrderId, OrderStatus},
    traits::{OrderStore, StatusTransition},
};

/// `Reconciler` applies one externally observed status event to one order.
///
/// The idempotence guarantee lives here: an event carrying the status the order already has is a no-op, so
/// replayed webhooks and duplicate polls never produce duplicate history entries or fulfillment records. The
/// atomicity guarantee lives in the store's [`OrderStore::apply_transition`], whose conditional write also closes
/// the race between two concurrent reconciliations of the same order.
pub struct Reconciler<B> {
    db: B,
}

impl<B> Debug for Reconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reconciler")
    }
}

impl<B> Reconciler<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn store(&self) -> &B {
        &self.db
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// False when the event was a replay (status unchanged) or a concurrent reconciliation won the race.
    pub applied: bool,
    pub status: OrderStatus,
    pub order: Order,
}

impl<B> Reconciler<B>
where B: OrderStore
{
    /// Apply an observed domain status to the order, if it differs from the stored one.
    ///
    /// Fails with [`CheckoutError::OrderNotFound`] when no such order exists. On a transition, the status fields,
    /// one history entry, `paid_at` (first completion only) and the fulfillment record (completion only) commit
    /// as a single atomic unit.
    pub async fn reconcile(
        &self,
        order_id: &OrderId,
        observed: OrderStatus,
        payload: Value,
        entry_type: HistoryType,
        source: &str,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        let order =
            self.db.fetch_order(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
        if order.status == observed {
            debug!("🔄️ Order {order_id} status unchanged ({observed}). Nothing to apply.");
            return Ok(ReconcileOutcome { applied: false, status: observed, order });
        }
        let transition = StatusTransition {
            order_id: order_id.clone(),
            expected_from: order.status.clone(),
            to: observed.clone(),
            entry_type,
            source: source.to_string(),
            payload,
        };
        let outcome = self.db.apply_transition(transition).await?;
        if outcome.applied {
            info!("🔄️ Order {order_id} moved from {} to {} (source: {source})", order.status, observed);
        } else {
            info!(
                "🔄️ Order {order_id} was reconciled concurrently; observed {} was not applied over {}",
                observed, outcome.order.status
            );
        }
        Ok(ReconcileOutcome { applied: outcome.applied, status: outcome.order.status.clone(), order: outcome.order })
    }
}

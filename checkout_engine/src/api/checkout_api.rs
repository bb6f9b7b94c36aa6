use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;
use serde_json::{json, Value};

use crate::{
    api::{
        checkout_objects::{CheckoutOutcome, CheckoutRequest, NotificationOutcome, OrderAudit, StatusCheckResult},
        errors::CheckoutError,
        reconciler::Reconciler,
    },
    db_types::{HistoryType, NewHistoryEntry, NewOrder, Order, OrderId, OrderStatus},
    helpers::{customer_snapshot, generate_order_id, line_items_snapshot, shipping_snapshot},
    status_mapper::map_status,
    traits::{ChargeRequest, GatewayStatus, OrderQueryFilter, OrderStore, PaymentGatewayClient},
};

/// Tunables for the request-level flows.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    /// How long a stored status is served without re-polling the gateway (pending orders are always re-polled).
    pub status_cache: Duration,
    /// When true, inbound notifications are verified against the gateway before being applied.
    pub verify_notifications: bool,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self { status_cache: Duration::seconds(30), verify_notifications: false }
    }
}

/// `CheckoutApi` is the primary API for the checkout payment flows: creating a payment transaction for a new
/// order, checking (and reconciling) its live status, and applying gateway webhook notifications.
pub struct CheckoutApi<B, G> {
    reconciler: Reconciler<B>,
    gateway: G,
    policy: CheckoutPolicy,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(store: B, gateway: G, policy: CheckoutPolicy) -> Self {
        Self { reconciler: Reconciler::new(store), gateway, policy }
    }

    pub fn store(&self) -> &B {
        self.reconciler.store()
    }

    pub fn reconciler(&self) -> &Reconciler<B> {
        &self.reconciler
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    /// The transaction creation flow.
    ///
    /// The order document is written (status `pending`) *before* the gateway is contacted, so a gateway failure
    /// never leaves a dangling order id without a record. On gateway failure the order stays pending with no
    /// payment payload and the caller gets [`CheckoutError::TransactionCreationFailed`].
    pub async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let (customer_details, item_details, mut transaction_details, payment_type) = request.validate()?;
        let order_id = transaction_details.order_id.clone().unwrap_or_else(generate_order_id);
        transaction_details.order_id = Some(order_id.clone());
        debug!("🛒️ Creating checkout for order {order_id}");

        let new_order = NewOrder {
            order_id: order_id.clone(),
            customer: customer_snapshot(&customer_details),
            items: line_items_snapshot(&item_details),
            shipping: shipping_snapshot(&item_details, &customer_details),
            payment_method: payment_type.clone().unwrap_or_else(|| "unknown".to_string()),
            amount: transaction_details.gross_amount,
        };
        self.store().insert_order(new_order).await?;

        let charge = ChargeRequest {
            transaction_details,
            customer_details,
            item_details,
            payment_type,
        };
        let session = match self.gateway.create_transaction(&charge).await {
            Ok(session) => session,
            Err(e) => {
                warn!("🛒️ Gateway rejected transaction creation for order {order_id}. {e}");
                return Err(CheckoutError::TransactionCreationFailed { order_id, message: e.to_string() });
            },
        };
        let entry = NewHistoryEntry {
            status: OrderStatus::Pending,
            entry_type: HistoryType::Initial,
            source: "checkout".to_string(),
            previous_status: None,
            payload: json!({
                "request": serde_json::to_value(&charge).unwrap_or(Value::Null),
                "response": session.raw,
            }),
        };
        let session_value = serde_json::to_value(&session).unwrap_or(Value::Null);
        let order = self.store().attach_payment_session(&order_id, session_value, entry).await?;
        info!("🛒️ Checkout created for order {order_id} ({})", order.amount);
        Ok(CheckoutOutcome { order_id, payment_session: session, order })
    }

    /// The status check flow: a read-through cache over the gateway's status endpoint.
    ///
    /// A settled order checked within the cache window is answered from stored data. Pending orders are always
    /// re-polled, since they are the ones expected to change. An upstream failure degrades to the stored data with an
    /// advisory message instead of failing the request.
    pub async fn check_status(&self, order_id: &OrderId, force_check: bool) -> Result<StatusCheckResult, CheckoutError> {
        let order =
            self.store().fetch_order(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
        let now = Utc::now();
        let fresh = order.last_checked.map(|t| now - t < self.policy.status_cache).unwrap_or(false);
        if !force_check && fresh && order.status != OrderStatus::Pending {
            trace!("🛒️ Serving status for order {order_id} from cache ({})", order.status);
            return Ok(StatusCheckResult { status: order.status.clone(), from_cache: true, advisory: None, order });
        }

        let live = match self.gateway.transaction_status(order_id).await {
            Ok(live) => live,
            Err(e) => {
                warn!("🛒️ Gateway status query failed for order {order_id}; serving stored data. {e}");
                return Ok(StatusCheckResult {
                    status: order.status.clone(),
                    from_cache: true,
                    advisory: Some(e.to_string()),
                    order,
                });
            },
        };
        let mapped = map_status(&live.transaction_status, live.fraud_status.as_deref());
        if mapped != order.status {
            self.reconciler.reconcile(order_id, mapped.clone(), live.raw, HistoryType::StatusCheck, "api").await?;
        }
        self.store().touch_last_checked(order_id).await?;
        // Report the stored status after reconciliation, not the mapped one. When a concurrent
        // reconciliation won the race, the stored status is the authoritative one.
        let order =
            self.store().fetch_order(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
        Ok(StatusCheckResult { status: order.status.clone(), from_cache: false, advisory: None, order })
    }

    /// The webhook notification flow.
    ///
    /// A payload without `order_id`/`transaction_status` is rejected outright. In verification mode the payload
    /// is re-fetched through the gateway; an order-id mismatch or a verification error rejects the notification
    /// before any state is touched.
    pub async fn handle_notification(&self, payload: Value) -> Result<NotificationOutcome, CheckoutError> {
        let claimed = GatewayStatus::from_payload(&payload).ok_or_else(|| {
            CheckoutError::InvalidNotification("missing order_id or transaction_status".to_string())
        })?;
        debug!("🛒️ Received notification for order {} ({})", claimed.order_id, claimed.transaction_status);

        let authoritative = if self.policy.verify_notifications {
            let verified = self
                .gateway
                .verify_notification(&payload)
                .await
                .map_err(|e| CheckoutError::VerificationFailed(e.to_string()))?;
            if verified.order_id != claimed.order_id {
                warn!(
                    "🛒️ Notification order id mismatch: claimed {}, verified {}",
                    claimed.order_id, verified.order_id
                );
                return Err(CheckoutError::VerificationFailed("order id mismatch".to_string()));
            }
            verified
        } else {
            claimed
        };

        let mapped = map_status(&authoritative.transaction_status, authoritative.fraud_status.as_deref());
        let order_id = authoritative.order_id.clone();
        let outcome = self
            .reconciler
            .reconcile(&order_id, mapped.clone(), authoritative.raw, HistoryType::Notification, "gateway")
            .await?;
        Ok(NotificationOutcome { order_id, status: mapped, applied: outcome.applied })
    }

    /// Fetch one order, failing with [`CheckoutError::OrderNotFound`] when absent.
    pub async fn order(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        self.store().fetch_order(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }

    /// Fetch orders matching the filter, most recent first.
    pub async fn orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.store().search_orders(query).await?)
    }

    /// Fetch an order together with its full audit trail.
    pub async fn order_audit(&self, order_id: &OrderId) -> Result<OrderAudit, CheckoutError> {
        let order = self.order(order_id).await?;
        let history = self.store().fetch_history(order_id).await?;
        let fulfillment = self.store().fetch_fulfillment(order_id).await?;
        Ok(OrderAudit { order, history, fulfillment })
    }
}

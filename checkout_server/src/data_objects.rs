use checkout_engine::{
    db_types::{Order, OrderStatus},
    traits::OrderQueryFilter,
    CheckoutOutcome,
    NotificationOutcome,
    OrderAudit,
    StatusCheckResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//----------------------------------------- Response envelopes -------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub success: bool,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub order: Order,
}

impl From<CheckoutOutcome> for TransactionResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            success: true,
            order_id: outcome.order_id.as_str().to_string(),
            token: outcome.payment_session.token,
            redirect_url: outcome.payment_session.redirect_url,
            order: outcome.order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub order_id: String,
    pub status: OrderStatus,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    pub order: Order,
}

impl From<StatusCheckResult> for StatusResponse {
    fn from(result: StatusCheckResult) -> Self {
        Self {
            success: true,
            order_id: result.order.order_id.as_str().to_string(),
            status: result.status,
            from_cache: result.from_cache,
            advisory: result.advisory,
            order: result.order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAck {
    pub success: bool,
    pub order_id: String,
    pub status: OrderStatus,
    pub applied: bool,
}

impl From<NotificationOutcome> for NotificationAck {
    fn from(outcome: NotificationOutcome) -> Self {
        Self {
            success: true,
            order_id: outcome.order_id.as_str().to_string(),
            status: outcome.status,
            applied: outcome.applied,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub count: usize,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderAuditResponse {
    pub success: bool,
    #[serde(flatten)]
    pub audit: OrderAudit,
}

//----------------------------------------- Query parameters --------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(default)]
    pub force_check: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl From<OrderListQuery> for OrderQueryFilter {
    fn from(q: OrderListQuery) -> Self {
        let mut filter = OrderQueryFilter::default();
        if let Some(status) = q.status {
            // The parse is infallible; unknown statuses become pass-through values and simply match nothing.
            if let Ok(status) = status.parse::<OrderStatus>() {
                filter = filter.with_status(status);
            }
        }
        if let Some(since) = q.since {
            filter = filter.since(since);
        }
        if let Some(until) = q.until {
            filter = filter.until(until);
        }
        if let Some(limit) = q.limit {
            filter = filter.with_limit(limit);
        }
        filter
    }
}

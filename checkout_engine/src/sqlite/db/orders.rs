use log::trace;
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId},
    traits::{OrderQueryFilter, OrderStoreError, StatusTransition},
};

/// Inserts a new order into the database using the given connection. You can embed this call inside a
/// transaction if you need atomicity with other writes, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer,
                items,
                shipping,
                payment_method,
                amount,
                gateway_order_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $1)
            RETURNING *;
        "#,
    )
    .bind(order.order_id.clone())
    .bind(Json(order.customer))
    .bind(Json(order.items))
    .bind(Json(order.shipping))
    .bind(order.payment_method)
    .bind(order.amount)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => Ok(order),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(OrderStoreError::OrderAlreadyExists(order.order_id))
        },
        Err(e) => Err(e.into()),
    }
}

/// Returns the entry in the orders table for the corresponding `order_id`.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in descending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

/// Records the gateway's payment-session payload on the order.
pub async fn attach_payment_session(
    order_id: &OrderId,
    session: Json<serde_json::Value>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET payment_data = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(session)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// The conditional status write at the heart of reconciliation.
///
/// All three status columns are written together, `paid_at` is set only on the first transition into
/// `completed`, and the raw payload lands in `last_notification` or `last_response` depending on the event type.
/// The WHERE clause keys the write on the expected previous status: when a concurrent reconciliation got there
/// first, no row matches and `None` is returned, leaving the order untouched.
pub async fn conditional_status_update(
    transition: &StatusTransition,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                status = $1,
                payment_status = $1,
                gateway_status = $1,
                paid_at = CASE WHEN $1 = 'completed' THEN COALESCE(paid_at, CURRENT_TIMESTAMP) ELSE paid_at END,
                last_notification = CASE WHEN $2 = 'notification' THEN $3 ELSE last_notification END,
                last_response = CASE WHEN $2 = 'status_check' THEN $3 ELSE last_response END,
                last_checked = CASE WHEN $2 = 'status_check' THEN CURRENT_TIMESTAMP ELSE last_checked END,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $4 AND status = $5
            RETURNING *;
        "#,
    )
    .bind(transition.to.to_string())
    .bind(transition.entry_type.to_string())
    .bind(Json(transition.payload.clone()))
    .bind(transition.order_id.as_str())
    .bind(transition.expected_from.to_string())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Records that a live status poll happened now.
pub async fn touch_last_checked(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET last_checked = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE order_id = $1",
    )
    .bind(order_id.as_str())
    .execute(conn)
    .await?;
    Ok(())
}

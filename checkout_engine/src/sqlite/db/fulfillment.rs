use sqlx::SqliteConnection;

use crate::db_types::{FulfillmentRecord, OrderId};

/// Creates the fulfillment record for an order if it does not already exist. The UNIQUE constraint on
/// `order_id` makes this safe to call on every completion event; only the first call inserts.
///
/// Returns true if a record was created by this call.
pub async fn create_if_absent(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT INTO fulfillment (order_id) VALUES ($1) ON CONFLICT (order_id) DO NOTHING")
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The fulfillment record for an order, if any.
pub async fn fetch_record(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<FulfillmentRecord>, sqlx::Error> {
    let row = sqlx::query_as("SELECT * FROM fulfillment WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

use sqlx::{types::Json, SqliteConnection};

use crate::db_types::{NewHistoryEntry, OrderId, StatusHistoryEntry};

/// Appends one history entry. History rows are never updated or deleted.
pub async fn insert_entry(
    order_id: &OrderId,
    entry: NewHistoryEntry,
    conn: &mut SqliteConnection,
) -> Result<StatusHistoryEntry, sqlx::Error> {
    let row = sqlx::query_as(
        r#"
            INSERT INTO status_history (order_id, status, entry_type, source, previous_status, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(entry.status.to_string())
    .bind(entry.entry_type.to_string())
    .bind(entry.source)
    .bind(entry.previous_status.map(|s| s.to_string()))
    .bind(Json(entry.payload))
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// All history entries for an order, in insertion order.
pub async fn fetch_entries(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
    let rows = sqlx::query_as("SELECT * FROM status_history WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

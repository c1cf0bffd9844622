use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{MatchingId, OrderSheetId, Payment, PaymentId, PaymentMethod, PaymentStatus};

/// Records a payment for an existing order sheet. Returns `None` if the order sheet does not exist. A second
/// payment for the same order sheet fails with a unique constraint violation.
pub async fn insert_payment(
    order_sheet: OrderSheetId,
    method: PaymentMethod,
    status: PaymentStatus,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO payments (order_sheet_id, method, status, paid_at)
        SELECT id, $1, $2, $3 FROM order_sheets WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(method)
    .bind(status)
    .bind(paid_at)
    .bind(order_sheet)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_payment(id: PaymentId, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_payment_for_order_sheet(
    order_sheet: OrderSheetId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_sheet_id = $1").bind(order_sheet).fetch_optional(conn).await
}

pub async fn fetch_payment_for_matching(
    matching: MatchingId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.* FROM payments p
        JOIN order_sheets o ON o.id = p.order_sheet_id
        WHERE o.matching_id = $1
        "#,
    )
    .bind(matching)
    .fetch_optional(conn)
    .await
}

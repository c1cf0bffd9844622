use sqlx::SqliteConnection;

use crate::db_types::{MatchingId, OrderCode, OrderSheet, OrderSheetId, RecipientDetails};

/// Inserts the order sheet. The `matching_id` and `order_code` columns are both unique, so this fails with a unique
/// constraint violation if either is already taken.
pub async fn insert_order_sheet(
    matching: MatchingId,
    code: &OrderCode,
    recipient: &RecipientDetails,
    conn: &mut SqliteConnection,
) -> Result<OrderSheet, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO order_sheets (
            matching_id,
            order_code,
            recipient_name,
            recipient_phone,
            recipient_email,
            origin_detail,
            destination_detail
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(matching)
    .bind(code.as_str())
    .bind(&recipient.recipient_name)
    .bind(&recipient.recipient_phone)
    .bind(&recipient.recipient_email)
    .bind(&recipient.origin_detail)
    .bind(&recipient.destination_detail)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order_sheet(id: OrderSheetId, conn: &mut SqliteConnection) -> Result<Option<OrderSheet>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_sheets WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_sheet_for_matching(
    matching: MatchingId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderSheet>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_sheets WHERE matching_id = $1").bind(matching).fetch_optional(conn).await
}

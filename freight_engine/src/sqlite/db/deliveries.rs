use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{CarrierId, Delivery, DeliveryId, DeliveryStatus, MatchingId, PaymentId},
    traits::{CarrierDeliveryRow, DeliveryBucket, Pagination},
};

/// Creates the `PENDING` delivery for a payment, copying the carrier from the accepted matching behind it.
///
/// Returns `None` if the payment does not exist. A second delivery for the same payment fails with a unique
/// constraint violation.
pub async fn insert_delivery(payment: PaymentId, conn: &mut SqliteConnection) -> Result<Option<Delivery>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO deliveries (payment_id, carrier_id, status)
        SELECT p.id, m.carrier_id, 'PENDING'
        FROM payments p
        JOIN order_sheets o ON o.id = p.order_sheet_id
        JOIN matchings m ON m.id = o.matching_id
        WHERE p.id = $1
        RETURNING *
        "#,
    )
    .bind(payment)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_delivery(id: DeliveryId, conn: &mut SqliteConnection) -> Result<Option<Delivery>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM deliveries WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_delivery_for_payment(
    payment: PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Delivery>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM deliveries WHERE payment_id = $1").bind(payment).fetch_optional(conn).await
}

pub async fn fetch_delivery_for_matching(
    matching: MatchingId,
    conn: &mut SqliteConnection,
) -> Result<Option<Delivery>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT d.* FROM deliveries d
        JOIN payments p ON p.id = d.payment_id
        JOIN order_sheets o ON o.id = p.order_sheet_id
        WHERE o.matching_id = $1
        "#,
    )
    .bind(matching)
    .fetch_optional(conn)
    .await
}

/// Compare-and-set. Only writes if the current status is still `expected`. Returns `None` if it was not.
pub async fn update_status(
    id: DeliveryId,
    expected: DeliveryStatus,
    new_status: DeliveryStatus,
    completed_at: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Option<Delivery>, sqlx::Error> {
    let delivery = sqlx::query_as(
        r#"
        UPDATE deliveries SET status = $1, completed_at = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3 AND status = $4
        RETURNING *
        "#,
    )
    .bind(new_status)
    .bind(completed_at)
    .bind(id)
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ {id} {expected} -> {new_status}: {}", if delivery.is_some() { "written" } else { "lost the race" });
    Ok(delivery)
}

/// The carrier's accepted matchings with everything downstream of them, filtered to one bucket.
pub async fn fetch_carrier_deliveries(
    carrier: CarrierId,
    bucket: DeliveryBucket,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<CarrierDeliveryRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
    SELECT
        m.id AS matching_id,
        e.id AS estimate_id,
        m.carrier_id AS carrier_id,
        e.origin_address,
        e.destination_address,
        e.cargo_type,
        e.total_cost,
        m.accepted_at,
        o.order_code,
        p.id AS payment_id,
        d.id AS delivery_id,
        d.status AS delivery_status,
        d.completed_at
    FROM matchings m
    JOIN estimates e ON e.id = m.estimate_id
    LEFT JOIN order_sheets o ON o.matching_id = m.id
    LEFT JOIN payments p ON p.order_sheet_id = o.id
    LEFT JOIN deliveries d ON d.payment_id = p.id
    WHERE m.is_accepted = 1 AND m.carrier_id = "#,
    );
    builder.push_bind(carrier);
    match bucket {
        DeliveryBucket::Unpaid => builder.push(" AND p.id IS NULL"),
        DeliveryBucket::InProgress => builder.push(" AND p.id IS NOT NULL AND (d.id IS NULL OR d.status <> 'COMPLETED')"),
        DeliveryBucket::Completed => builder.push(" AND d.status = 'COMPLETED'"),
    };
    builder.push(" ORDER BY m.id DESC LIMIT ");
    builder.push_bind(page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(page.offset());
    trace!("🗃️ Carrier deliveries query: {}", builder.sql());
    builder.build_query_as().fetch_all(conn).await
}

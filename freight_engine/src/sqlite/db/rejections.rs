use sqlx::SqliteConnection;

use crate::db_types::{CarrierId, EstimateId, RejectedMatching};

/// Adds a (carrier, estimate) pair to the rejection ledger, provided the estimate is still open.
///
/// Returns `None` if the estimate does not exist or is not open. A second rejection of the same pair fails with a
/// unique constraint violation.
pub async fn insert_rejection(
    carrier: CarrierId,
    estimate: EstimateId,
    conn: &mut SqliteConnection,
) -> Result<Option<RejectedMatching>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO rejected_matchings (carrier_id, estimate_id)
        SELECT $1, id FROM estimates WHERE id = $2 AND is_temp = 0 AND matched = 0
        RETURNING *
        "#,
    )
    .bind(carrier)
    .bind(estimate)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_rejections_for_carrier(
    carrier: CarrierId,
    conn: &mut SqliteConnection,
) -> Result<Vec<RejectedMatching>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM rejected_matchings WHERE carrier_id = $1 ORDER BY id").bind(carrier).fetch_all(conn).await
}

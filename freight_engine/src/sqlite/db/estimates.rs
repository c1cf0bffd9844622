use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Estimate, EstimateId, MatchingId, NewEstimate, ShipperId, Won},
    traits::Pagination,
};

/// Inserts a new estimate. `total` must be the sum of the breakdown.
///
/// This does not create the candidate matching for submitted estimates. Call [`super::matchings::open_candidacy`]
/// in the same transaction for that.
pub async fn insert_estimate(
    shipper: ShipperId,
    estimate: NewEstimate,
    total: Won,
    conn: &mut SqliteConnection,
) -> Result<Estimate, sqlx::Error> {
    let estimate = sqlx::query_as(
        r#"
            INSERT INTO estimates (
                shipper_id,
                origin_address,
                destination_address,
                weight_kg,
                cargo_type,
                start_time,
                base_cost,
                distance_cost,
                special_option_cost,
                total_cost,
                is_temp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(shipper)
    .bind(estimate.origin_address)
    .bind(estimate.destination_address)
    .bind(estimate.weight_kg)
    .bind(estimate.cargo_type)
    .bind(estimate.start_time)
    .bind(estimate.cost.base_cost)
    .bind(estimate.cost.distance_cost)
    .bind(estimate.cost.special_option_cost)
    .bind(total)
    .bind(estimate.is_temp)
    .fetch_one(conn)
    .await?;
    Ok(estimate)
}

pub async fn fetch_estimate(id: EstimateId, conn: &mut SqliteConnection) -> Result<Option<Estimate>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM estimates WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_estimates_for_shipper(
    shipper: ShipperId,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Estimate>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM estimates WHERE shipper_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3")
        .bind(shipper)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(conn)
        .await
}

/// Guarded write: sets `matched` on a submitted, unmatched estimate. Returns `None` if the guard did not hold, which
/// means either the estimate does not exist, is a draft, or has already been matched.
pub async fn mark_matched(id: EstimateId, conn: &mut SqliteConnection) -> Result<Option<EstimateId>, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"
        UPDATE estimates SET matched = 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND matched = 0 AND is_temp = 0
        RETURNING id
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ mark_matched guard result: {id:?}");
    Ok(id)
}

/// Guarded write: sets `is_ordered` on the estimate behind an accepted matching, provided it has not been ordered
/// yet. Returns the estimate id, or `None` if the guard did not hold.
pub async fn mark_ordered_for_matching(
    matching: MatchingId,
    conn: &mut SqliteConnection,
) -> Result<Option<EstimateId>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE estimates SET is_ordered = 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = (SELECT estimate_id FROM matchings WHERE id = $1 AND is_accepted = 1)
          AND matched = 1 AND is_ordered = 0
        RETURNING id
        "#,
    )
    .bind(matching)
    .fetch_optional(conn)
    .await
}

/// Guarded write: turns a draft into a submitted estimate. Returns `None` if the estimate does not exist or is not a
/// draft.
pub async fn submit_draft(id: EstimateId, conn: &mut SqliteConnection) -> Result<Option<Estimate>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE estimates SET is_temp = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND is_temp = 1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Deletes the estimate if it is a draft. Returns `true` if a row was removed.
pub async fn delete_draft(id: EstimateId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM estimates WHERE id = $1 AND is_temp = 1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

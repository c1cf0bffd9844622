use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CarrierId, Estimate, EstimateId, Matching, MatchingId},
    traits::Pagination,
};

/// Creates the unclaimed candidacy (no carrier) for a submitted estimate.
pub async fn open_candidacy(estimate: EstimateId, conn: &mut SqliteConnection) -> Result<Matching, sqlx::Error> {
    let matching: Matching =
        sqlx::query_as("INSERT INTO matchings (estimate_id) VALUES ($1) RETURNING *").bind(estimate).fetch_one(conn).await?;
    trace!("🗃️ Candidacy {} opened for {estimate}", matching.id);
    Ok(matching)
}

/// Claims the oldest unclaimed candidacy of the estimate for `carrier`, setting the carrier, acceptance flag and
/// acceptance time in one statement. Returns `None` if there is no open candidacy.
pub async fn claim_candidacy(
    estimate: EstimateId,
    carrier: CarrierId,
    accepted_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Matching>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE matchings SET carrier_id = $1, is_accepted = 1, accepted_at = $2
        WHERE id = (
            SELECT id FROM matchings
            WHERE estimate_id = $3 AND carrier_id IS NULL AND is_accepted = 0
            ORDER BY id LIMIT 1
        )
        RETURNING *
        "#,
    )
    .bind(carrier)
    .bind(accepted_at)
    .bind(estimate)
    .fetch_optional(conn)
    .await
}

/// Inserts an already-accepted matching. Used when an estimate has no open candidacy to claim.
pub async fn insert_accepted(
    estimate: EstimateId,
    carrier: CarrierId,
    accepted_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Matching, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO matchings (estimate_id, carrier_id, is_accepted, accepted_at)
        VALUES ($1, $2, 1, $3)
        RETURNING *
        "#,
    )
    .bind(estimate)
    .bind(carrier)
    .bind(accepted_at)
    .fetch_one(conn)
    .await
}

pub async fn fetch_matching(id: MatchingId, conn: &mut SqliteConnection) -> Result<Option<Matching>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM matchings WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_matchings_for_estimate(
    estimate: EstimateId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Matching>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM matchings WHERE estimate_id = $1 ORDER BY id").bind(estimate).fetch_all(conn).await
}

pub async fn fetch_accepted_matching(
    estimate: EstimateId,
    conn: &mut SqliteConnection,
) -> Result<Option<Matching>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM matchings WHERE estimate_id = $1 AND is_accepted = 1")
        .bind(estimate)
        .fetch_optional(conn)
        .await
}

/// Open estimates that `carrier` has not rejected, newest first.
pub async fn fetch_candidates(
    carrier: CarrierId,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Estimate>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT e.* FROM estimates e
        WHERE e.is_temp = 0 AND e.matched = 0 AND e.is_ordered = 0
          AND NOT EXISTS (
            SELECT 1 FROM rejected_matchings r WHERE r.estimate_id = e.id AND r.carrier_id = $1
          )
        ORDER BY e.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(carrier)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(conn)
    .await
}

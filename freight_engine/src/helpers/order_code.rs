use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::OrderCode;

/// How many times an order code is regenerated after colliding with an existing one before giving up.
pub const MAX_ORDER_CODE_ATTEMPTS: usize = 5;

/// Generates a human-readable order code: the UTC creation time as `YYYYMMDDHHMMSS` followed by a six-digit random
/// suffix, e.g. `20240301143015042917`.
///
/// Codes are not guaranteed to be unique. The `order_sheets.order_code` column carries a unique constraint and
/// callers regenerate on a collision.
pub fn generate_order_code<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> OrderCode {
    let suffix: u32 = rng.gen_range(0..1_000_000);
    OrderCode(format!("{}{suffix:06}", now.format("%Y%m%d%H%M%S")))
}

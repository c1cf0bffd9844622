use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{
    CarrierId,
    ConversionError,
    Delivery,
    DeliveryId,
    DeliveryStatus,
    EstimateId,
    MatchingId,
    OrderCode,
    Payment,
    PaymentId,
    Won,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 200;

/// A window into a listing. Listings are always sorted newest first, so pages are stable as long as nothing new is
/// inserted between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub count: Option<i64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { offset: Some(0), count: Some(DEFAULT_PAGE_SIZE) }
    }
}

impl Pagination {
    pub fn new(offset: i64, count: i64) -> Self {
        Self { offset: Some(offset), count: Some(count) }
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// The page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.count.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Fills in a missing count with `page_size`.
    pub fn with_default_count(mut self, page_size: i64) -> Self {
        if self.count.is_none() {
            self.count = Some(page_size);
        }
        self
    }
}

/// The three reporting views over a carrier's work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBucket {
    /// Accepted, but not paid for yet. The order sheet may or may not exist.
    Unpaid,
    /// Paid, and the delivery has not been completed.
    InProgress,
    Completed,
}

impl Display for DeliveryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryBucket::Unpaid => write!(f, "unpaid"),
            DeliveryBucket::InProgress => write!(f, "in_progress"),
            DeliveryBucket::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for DeliveryBucket {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "in_progress" | "paid_in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            s => Err(ConversionError::new("delivery bucket", s)),
        }
    }
}

/// One line of a carrier's delivery report. Columns downstream of the bucket's stage are `None`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CarrierDeliveryRow {
    pub matching_id: MatchingId,
    pub estimate_id: EstimateId,
    pub carrier_id: CarrierId,
    pub origin_address: String,
    pub destination_address: String,
    pub cargo_type: String,
    pub total_cost: Won,
    pub accepted_at: Option<DateTime<Utc>>,
    pub order_code: Option<OrderCode>,
    pub payment_id: Option<PaymentId>,
    pub delivery_id: Option<DeliveryId>,
    pub delivery_status: Option<DeliveryStatus>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The result of recording a payment. The delivery is `None` only when it was not requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertPaymentResult {
    pub payment: Payment,
    pub delivery: Option<Delivery>,
}

use std::fmt::Display;

use freight_engine::db_types::{EstimateId, PaymentMethod};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Body of `POST /api/orders/{id}/payment`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedStatus {
    pub estimate_id: EstimateId,
    pub matched: bool,
}

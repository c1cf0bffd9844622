use serde::{Deserialize, Serialize};

use crate::db_types::{Delivery, Estimate, Matching, OrderSheet, Payment};

/// A carrier accepted an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateMatchedEvent {
    pub estimate: Estimate,
    pub matching: Matching,
}

impl EstimateMatchedEvent {
    pub fn new(estimate: Estimate, matching: Matching) -> Self {
        Self { estimate, matching }
    }
}

/// A payment was recorded for an order. This is what the notification collaborator listens to in order to tell the
/// carrier that the job is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAcceptedEvent {
    pub order: OrderSheet,
    pub payment: Payment,
    pub delivery: Option<Delivery>,
}

impl PaymentAcceptedEvent {
    pub fn new(order: OrderSheet, payment: Payment, delivery: Option<Delivery>) -> Self {
        Self { order, payment, delivery }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCompletedEvent {
    pub delivery: Delivery,
}

impl DeliveryCompletedEvent {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }
}


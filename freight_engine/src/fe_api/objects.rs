use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{
    Carrier,
    CostBreakdown,
    Delivery,
    DeliveryStatus,
    Estimate,
    Matching,
    OrderCode,
    OrderSheet,
    Payment,
    PaymentId,
    PaymentMethod,
    PaymentStatus,
    Shipper,
    Won,
};

/// Everything the shipper needs to see when filling in the recipient details for an accepted match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderForm {
    pub matching: Matching,
    pub estimate: Estimate,
    pub shipper: Shipper,
    pub carrier: Option<Carrier>,
    pub cost: CostBreakdown,
    pub total_cost: Won,
    /// Present once the order has been confirmed
    pub order: Option<OrderSheet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedPayment {
    pub payment: Payment,
    pub delivery: Option<Delivery>,
}

/// The payment confirmation shown to both parties once an order has been paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub payment_id: PaymentId,
    pub order_code: OrderCode,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_email: Option<String>,
    pub origin_address: String,
    pub destination_address: String,
    pub cargo_type: String,
    pub carrier_name: String,
    pub carrier_phone: String,
    pub total_cost: Won,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
    pub delivery_status: Option<DeliveryStatus>,
}

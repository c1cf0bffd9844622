use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use freight_common::Won;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Declares an integer primary-key newtype. Each entity gets its own id type so that, say, a `PaymentId` can never be
/// passed where a `DeliveryId` is expected.
macro_rules! id_type {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

id_type!(EstimateId, "estimate");
id_type!(MatchingId, "matching");
id_type!(RejectionId, "rejection");
id_type!(OrderSheetId, "order");
id_type!(PaymentId, "payment");
id_type!(DeliveryId, "delivery");
id_type!(ShipperId, "shipper");
id_type!(CarrierId, "carrier");

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {kind}: {value}")]
pub struct ConversionError {
    kind: &'static str,
    value: String,
}

impl ConversionError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

//--------------------------------------        Actor         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Shipper,
    Carrier,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Shipper => write!(f, "shipper"),
            Role::Carrier => write!(f, "carrier"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipper" | "member" => Ok(Self::Shipper),
            "carrier" | "cargo_owner" => Ok(Self::Carrier),
            _ => Err(ConversionError::new("role", s)),
        }
    }
}

/// The authenticated principal performing an operation. It is resolved once at the transport boundary and passed
/// explicitly into every pipeline call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Shipper(ShipperId),
    Carrier(CarrierId),
}

impl Actor {
    pub fn role(&self) -> Role {
        match self {
            Actor::Shipper(_) => Role::Shipper,
            Actor::Carrier(_) => Role::Carrier,
        }
    }

    pub fn shipper_id(&self) -> Option<ShipperId> {
        match self {
            Actor::Shipper(id) => Some(*id),
            Actor::Carrier(_) => None,
        }
    }

    pub fn carrier_id(&self) -> Option<CarrierId> {
        match self {
            Actor::Carrier(id) => Some(*id),
            Actor::Shipper(_) => None,
        }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Shipper(id) => write!(f, "{id}"),
            Actor::Carrier(id) => write!(f, "{id}"),
        }
    }
}

//--------------------------------------       Profiles       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Shipper {
    pub id: ShipperId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShipper {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewShipper {
    pub fn new<S: Into<String>>(name: S, phone: S) -> Self {
        Self { name: name.into(), phone: phone.into(), email: None, address: None }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Carrier {
    pub id: CarrierId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCarrier {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
}

impl NewCarrier {
    pub fn new<S: Into<String>>(name: S, phone: S) -> Self {
        Self { name: name.into(), phone: phone.into(), email: None, vehicle_number: None }
    }

    pub fn with_vehicle<S: Into<String>>(mut self, vehicle_number: S) -> Self {
        self.vehicle_number = Some(vehicle_number.into());
        self
    }
}

//--------------------------------------       Estimate       ---------------------------------------------------------
/// The price of an estimate as quoted by the pricing collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base_cost: Won,
    pub distance_cost: Won,
    pub special_option_cost: Won,
}

impl CostBreakdown {
    pub fn new(base_cost: i64, distance_cost: i64, special_option_cost: i64) -> Self {
        Self {
            base_cost: Won::from(base_cost),
            distance_cost: Won::from(distance_cost),
            special_option_cost: Won::from(special_option_cost),
        }
    }

    /// The sum of the components, or `None` if it overflows.
    pub fn total(&self) -> Option<Won> {
        self.base_cost.checked_add(self.distance_cost)?.checked_add(self.special_option_cost)
    }

    pub fn has_negative_component(&self) -> bool {
        self.base_cost.is_negative() || self.distance_cost.is_negative() || self.special_option_cost.is_negative()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Estimate {
    pub id: EstimateId,
    pub shipper_id: ShipperId,
    pub origin_address: String,
    pub destination_address: String,
    pub weight_kg: i64,
    pub cargo_type: String,
    pub start_time: DateTime<Utc>,
    pub base_cost: Won,
    pub distance_cost: Won,
    pub special_option_cost: Won,
    pub total_cost: Won,
    /// Draft estimates are never shown to carriers.
    pub is_temp: bool,
    /// An accepted matching exists. Never reverts once set.
    pub matched: bool,
    /// An order sheet exists downstream of the accepted matching.
    pub is_ordered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    pub fn cost(&self) -> CostBreakdown {
        CostBreakdown {
            base_cost: self.base_cost,
            distance_cost: self.distance_cost,
            special_option_cost: self.special_option_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEstimate {
    pub origin_address: String,
    pub destination_address: String,
    pub weight_kg: i64,
    pub cargo_type: String,
    pub start_time: DateTime<Utc>,
    pub cost: CostBreakdown,
    #[serde(default)]
    pub is_temp: bool,
}

impl NewEstimate {
    pub fn new<S: Into<String>>(origin: S, destination: S, weight_kg: i64, cargo_type: S, cost: CostBreakdown) -> Self {
        Self {
            origin_address: origin.into(),
            destination_address: destination.into(),
            weight_kg,
            cargo_type: cargo_type.into(),
            start_time: Utc::now(),
            cost,
            is_temp: false,
        }
    }

    pub fn as_draft(mut self) -> Self {
        self.is_temp = true;
        self
    }

    pub fn starting_at(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }
}

//--------------------------------------       Matching       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Matching {
    pub id: MatchingId,
    pub estimate_id: EstimateId,
    /// `None` while the candidacy is unclaimed.
    pub carrier_id: Option<CarrierId>,
    pub is_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Matching {
    pub fn is_accepted_by(&self, carrier: CarrierId) -> bool {
        self.is_accepted && self.carrier_id == Some(carrier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RejectedMatching {
    pub id: RejectionId,
    pub carrier_id: CarrierId,
    pub estimate_id: EstimateId,
    pub rejected_at: DateTime<Utc>,
}

//--------------------------------------      OrderSheet      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderCode(pub String);

impl OrderCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<String> for OrderCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Delivery details supplied by the shipper when confirming an accepted match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientDetails {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_email: Option<String>,
    /// Building, floor, dock etc. at the origin address
    pub origin_detail: String,
    pub destination_detail: String,
}

impl RecipientDetails {
    pub fn new<S: Into<String>>(name: S, phone: S) -> Self {
        Self {
            recipient_name: name.into(),
            recipient_phone: phone.into(),
            recipient_email: None,
            origin_detail: String::default(),
            destination_detail: String::default(),
        }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.recipient_email = Some(email.into());
        self
    }

    pub fn with_details<S: Into<String>>(mut self, origin_detail: S, destination_detail: S) -> Self {
        self.origin_detail = origin_detail.into();
        self.destination_detail = destination_detail.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderSheet {
    pub id: OrderSheetId,
    pub matching_id: MatchingId,
    pub order_code: OrderCode,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_email: Option<String>,
    pub origin_detail: String,
    pub destination_detail: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Payment        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    VirtualAccount,
    MobilePay,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::BankTransfer => write!(f, "BANK_TRANSFER"),
            PaymentMethod::VirtualAccount => write!(f, "VIRTUAL_ACCOUNT"),
            PaymentMethod::MobilePay => write!(f, "MOBILE_PAY"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "VIRTUAL_ACCOUNT" => Ok(Self::VirtualAccount),
            "MOBILE_PAY" => Ok(Self::MobilePay),
            s => Err(ConversionError::new("payment method", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded, but the settlement has not been confirmed by the payment provider
    Pending,
    Paid,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Paid => write!(f, "PAID"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            s => Err(ConversionError::new("payment status", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_sheet_id: OrderSheetId,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

//--------------------------------------       Delivery       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    InTransit,
    Completed,
}

/// The outcome of asking a delivery to move to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The delivery must be updated to the given status.
    Apply(DeliveryStatus),
    /// The delivery is already in the requested status. Nothing is written.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A delivery cannot move from {from} to {to}")]
pub struct IllegalTransition {
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
}

impl DeliveryStatus {
    /// Works out what moving from `self` to `target` means.
    ///
    /// | From \ To  | InTransit | Completed        |
    /// |------------|-----------|------------------|
    /// | Pending    | Apply     | Apply if allowed |
    /// | InTransit  | Unchanged | Apply            |
    /// | Completed  | Err       | Unchanged        |
    ///
    /// Nothing ever moves back to `Pending`.
    pub fn transition_to(
        self,
        target: DeliveryStatus,
        allow_complete_from_pending: bool,
    ) -> Result<StatusChange, IllegalTransition> {
        use DeliveryStatus::*;
        match (self, target) {
            (from, to) if from == to => Ok(StatusChange::Unchanged),
            (Pending, InTransit) | (InTransit, Completed) => Ok(StatusChange::Apply(target)),
            (Pending, Completed) if allow_complete_from_pending => Ok(StatusChange::Apply(target)),
            (from, to) => Err(IllegalTransition { from, to }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Completed)
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "PENDING"),
            DeliveryStatus::InTransit => write!(f, "IN_TRANSIT"),
            DeliveryStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "COMPLETED" => Ok(Self::Completed),
            s => Err(ConversionError::new("delivery status", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub payment_id: PaymentId,
    /// Copied from the accepted matching when the delivery is created
    pub carrier_id: CarrierId,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set exactly when `status` is `Completed`
    pub completed_at: Option<DateTime<Utc>>,
}

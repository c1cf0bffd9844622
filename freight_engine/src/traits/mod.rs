//! # Backend interfaces
//!
//! The traits in this module are the contracts that a storage backend must fulfil to host the fulfillment pipeline.
//! Each stage of the pipeline has its own trait, so that an API only depends on the stages it touches:
//!
//! * [`EstimateManagement`]: the estimate store.
//! * [`MatchingManagement`]: candidate listings, accept/reject decisions and the rejection ledger.
//! * [`OrderManagement`]: order sheets created from accepted matchings.
//! * [`PaymentManagement`]: the payment ledger.
//! * [`DeliveryManagement`]: delivery rows and the carrier reporting views.
//! * [`ProfileManagement`]: the shipper and carrier profiles consulted for display fields.
//!
//! [`FulfillmentDatabase`] bundles all of them.
//!
//! Backends enforce the cross-entity invariants themselves (one accepted matching per estimate, one order sheet per
//! matching, one payment per order sheet, one delivery per payment), so that two racing requests can never both
//! succeed regardless of what the API layer checked beforehand.
mod data_objects;
mod delivery_management;
mod errors;
mod estimate_management;
mod fulfillment_database;
mod matching_management;
mod order_management;
mod payment_management;
mod profile_management;

pub use data_objects::{
    CarrierDeliveryRow,
    DeliveryBucket,
    InsertPaymentResult,
    Pagination,
    DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use delivery_management::DeliveryManagement;
pub(crate) use errors::{is_foreign_key_violation, is_unique_violation};
pub use errors::{ErrorKind, FulfillmentError};
pub use estimate_management::EstimateManagement;
pub use fulfillment_database::FulfillmentDatabase;
pub use matching_management::MatchingManagement;
pub use order_management::OrderManagement;
pub use payment_management::PaymentManagement;
pub use profile_management::ProfileManagement;

//! Freight Fulfillment Engine
//!
//! The freight fulfillment engine carries a shipment request through the brokerage pipeline:
//!
//! ```text
//! Estimate -> Matching -> OrderSheet -> Payment -> Delivery
//! ```
//!
//! with a rejection ledger on the side that keeps declined estimates away from the carriers that declined them.
//!
//! The library is divided into these main sections:
//! 1. The domain types ([`mod@db_types`]) shared by every layer.
//! 2. The backend traits ([`mod@traits`]). A storage backend implements these to host the pipeline. The backends are
//!    responsible for the cross-entity invariants (exclusive acceptance, one order per matching, one payment per
//!    order and one delivery per payment), which they must enforce atomically. SQLite is the supported backend.
//! 3. The public API (`fe_api`). One API object per pipeline stage, constructed over any backend implementing the
//!    traits that stage needs. Every call takes the acting shipper or carrier explicitly.
//!
//! The engine also emits events when an estimate is matched, a payment is accepted and a delivery is completed.
//! Subscribe to these through [`events::EventHooks`].
pub mod db_types;
pub mod events;
mod fe_api;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use fe_api::{
    delivery_api::{DeliveryApi, DeliveryPolicy},
    estimate_api::EstimateApi,
    matching_api::MatchingApi,
    objects,
    order_api::OrderApi,
    payment_api::PaymentApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use traits::{
    DeliveryManagement,
    ErrorKind,
    EstimateManagement,
    FulfillmentDatabase,
    FulfillmentError,
    MatchingManagement,
    OrderManagement,
    Pagination,
    PaymentManagement,
    ProfileManagement,
};

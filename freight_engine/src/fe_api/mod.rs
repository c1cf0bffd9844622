//! # Fulfillment pipeline public API
//!
//! The `fe_api` module exposes the programmatic API of the pipeline. There is one API per stage, so that clients
//! only depend on the backend traits for the stages they use:
//!
//! * [`estimate_api`]: shippers create, submit and delete estimates.
//! * [`matching_api`]: carriers list candidates and accept or reject them.
//! * [`order_api`]: shippers turn an accepted matching into an order sheet.
//! * [`payment_api`]: the payment ledger, and the payment confirmation summary.
//! * [`delivery_api`]: the delivery state machine and the carrier's reporting views.
//!
//! Every operation takes the acting [`Actor`] explicitly. Ownership checks happen here. Uniqueness and state
//! guards are enforced again by the backend, atomically, so a check here is only ever a fast path for a clear error.
//!
//! # API usage
//!
//! ```rust,ignore
//! use freight_engine::{MatchingApi, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = MatchingApi::new(db, EventProducers::default());
//! let matching = api.accept(estimate_id, Actor::Carrier(carrier_id)).await?;
//! ```
use crate::{
    db_types::{Actor, CarrierId, Role, ShipperId},
    traits::FulfillmentError,
};

pub mod delivery_api;
pub mod estimate_api;
pub mod matching_api;
pub mod objects;
pub mod order_api;
pub mod payment_api;

pub(crate) fn acting_shipper(actor: Actor) -> Result<ShipperId, FulfillmentError> {
    actor.shipper_id().ok_or(FulfillmentError::WrongRole(Role::Shipper))
}

pub(crate) fn acting_carrier(actor: Actor) -> Result<CarrierId, FulfillmentError> {
    actor.carrier_id().ok_or(FulfillmentError::WrongRole(Role::Carrier))
}

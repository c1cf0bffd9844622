use std::fmt::Display;

use thiserror::Error;

use crate::db_types::{
    CarrierId,
    DeliveryId,
    DeliveryStatus,
    EstimateId,
    IllegalTransition,
    MatchingId,
    OrderSheetId,
    PaymentId,
    ShipperId,
};

/// The broad class of a [`FulfillmentError`]. Callers (the HTTP layer in particular) react to the kind rather than to
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    Forbidden,
    InvalidInput,
    Backend,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Backend => "backend failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("Could not generate a unique order code after {0} attempts")]
    OrderCodeExhausted(usize),

    // ---------------------------------------  Not found  ---------------------------------------
    #[error("The requested estimate {0} does not exist")]
    EstimateNotFound(EstimateId),
    #[error("The requested matching {0} does not exist")]
    MatchingNotFound(MatchingId),
    #[error("The requested order sheet {0} does not exist")]
    OrderSheetNotFound(OrderSheetId),
    #[error("The requested payment {0} does not exist")]
    PaymentNotFound(PaymentId),
    #[error("The requested delivery {0} does not exist")]
    DeliveryNotFound(DeliveryId),
    #[error("The requested shipper {0} does not exist")]
    ShipperNotFound(ShipperId),
    #[error("The requested carrier {0} does not exist")]
    CarrierNotFound(CarrierId),

    // ---------------------------------------  Conflict  ----------------------------------------
    #[error("Estimate {0} has already been matched with a carrier")]
    EstimateAlreadyMatched(EstimateId),
    #[error("{carrier} has already rejected {estimate}")]
    DuplicateRejection { carrier: CarrierId, estimate: EstimateId },
    #[error("An order sheet already exists for {0}")]
    OrderAlreadyExists(MatchingId),
    #[error("A payment already exists for {0}")]
    PaymentAlreadyExists(OrderSheetId),
    #[error("A delivery already exists for {0}")]
    DeliveryAlreadyExists(PaymentId),
    #[error("{0} was modified by another request. Reload and try again.")]
    ConcurrentModification(DeliveryId),

    // -------------------------------------  Invalid state  -------------------------------------
    #[error("Estimate {0} is still a draft")]
    EstimateIsDraft(EstimateId),
    #[error("Estimate {0} has already been submitted")]
    EstimateAlreadySubmitted(EstimateId),
    #[error("Estimate {0} is no longer open for matching")]
    EstimateNoLongerOpen(EstimateId),
    #[error("Matching {0} has not been accepted by a carrier")]
    MatchingNotAccepted(MatchingId),
    #[error("No payment has been accepted for {0}")]
    PaymentRequired(MatchingId),
    #[error("No delivery has been created for {0}")]
    DeliveryNotCreated(MatchingId),
    #[error("A delivery cannot move from {from} to {to}")]
    IllegalDeliveryTransition { from: DeliveryStatus, to: DeliveryStatus },

    // ---------------------------------------  Forbidden  ---------------------------------------
    #[error("Only the shipper that owns {0} may do this")]
    NotEstimateOwner(EstimateId),
    #[error("Only the carrier assigned to {0} may do this")]
    NotAssignedCarrier(MatchingId),
    #[error("Only the carrier responsible for {0} may update it")]
    NotDeliveryCarrier(DeliveryId),
    #[error("Only the shipper or the carrier of {0} may view this")]
    NotAParty(MatchingId),
    #[error("This action requires the {0} role")]
    WrongRole(crate::db_types::Role),
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        use FulfillmentError::*;
        match self {
            DatabaseError(_) | OrderCodeExhausted(_) => ErrorKind::Backend,
            InvalidInput(_) => ErrorKind::InvalidInput,
            EstimateNotFound(_) |
            MatchingNotFound(_) |
            OrderSheetNotFound(_) |
            PaymentNotFound(_) |
            DeliveryNotFound(_) |
            ShipperNotFound(_) |
            CarrierNotFound(_) => ErrorKind::NotFound,
            EstimateAlreadyMatched(_) |
            DuplicateRejection { .. } |
            OrderAlreadyExists(_) |
            PaymentAlreadyExists(_) |
            DeliveryAlreadyExists(_) |
            ConcurrentModification(_) => ErrorKind::Conflict,
            EstimateIsDraft(_) |
            EstimateAlreadySubmitted(_) |
            EstimateNoLongerOpen(_) |
            MatchingNotAccepted(_) |
            PaymentRequired(_) |
            DeliveryNotCreated(_) |
            IllegalDeliveryTransition { .. } => ErrorKind::InvalidState,
            NotEstimateOwner(_) | NotAssignedCarrier(_) | NotDeliveryCarrier(_) | NotAParty(_) | WrongRole(_) => {
                ErrorKind::Forbidden
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}

impl From<IllegalTransition> for FulfillmentError {
    fn from(e: IllegalTransition) -> Self {
        FulfillmentError::IllegalDeliveryTransition { from: e.from, to: e.to }
    }
}

/// True if the driver error is a violation of a `UNIQUE` constraint or index.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(err) if err.is_unique_violation())
}

/// True if the driver error is a `REFERENCES` violation, i.e. a referenced profile or row does not exist.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(err) if err.is_foreign_key_violation())
}

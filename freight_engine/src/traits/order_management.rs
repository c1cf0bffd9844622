use crate::{
    db_types::{MatchingId, OrderSheet, OrderSheetId, RecipientDetails},
    traits::FulfillmentError,
};

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Creates the order sheet for an accepted matching and marks its estimate as ordered, atomically.
    ///
    /// A fresh order code is generated for each attempt. If the code collides with an existing one the insert is
    /// retried with a new code, up to [`crate::helpers::MAX_ORDER_CODE_ATTEMPTS`] times.
    ///
    /// ## Failure modes:
    /// * `MatchingNotFound` if the matching does not exist.
    /// * `MatchingNotAccepted` if no carrier has accepted the matching.
    /// * `OrderAlreadyExists` if an order sheet has already been created for the matching.
    async fn insert_order_sheet(
        &self,
        matching: MatchingId,
        recipient: RecipientDetails,
    ) -> Result<OrderSheet, FulfillmentError>;

    async fn fetch_order_sheet(&self, id: OrderSheetId) -> Result<Option<OrderSheet>, FulfillmentError>;

    async fn fetch_order_sheet_for_matching(&self, matching: MatchingId)
        -> Result<Option<OrderSheet>, FulfillmentError>;
}

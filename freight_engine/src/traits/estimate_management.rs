use crate::{
    db_types::{Estimate, EstimateId, NewEstimate, ShipperId},
    traits::{FulfillmentError, Pagination},
};

/// The estimate store. Estimates are created by shippers, either as drafts or submitted straight away.
#[allow(async_fn_in_trait)]
pub trait EstimateManagement {
    /// Stores a new estimate for `shipper`.
    ///
    /// If the estimate is not a draft, an unclaimed candidate matching (no carrier) is created for it in the same
    /// transaction.
    async fn insert_estimate(&self, shipper: ShipperId, estimate: NewEstimate) -> Result<Estimate, FulfillmentError>;

    async fn fetch_estimate(&self, id: EstimateId) -> Result<Option<Estimate>, FulfillmentError>;

    /// Fetches the estimates belonging to `shipper`, newest first.
    async fn fetch_estimates_for_shipper(
        &self,
        shipper: ShipperId,
        page: Pagination,
    ) -> Result<Vec<Estimate>, FulfillmentError>;

    /// Turns a draft into a submitted estimate and opens its unclaimed candidacy.
    ///
    /// ## Failure modes:
    /// * `EstimateNotFound` if the estimate does not exist.
    /// * `EstimateAlreadySubmitted` if the estimate is not a draft.
    async fn submit_estimate(&self, id: EstimateId) -> Result<Estimate, FulfillmentError>;

    /// Permanently removes a draft estimate. Submitted estimates are kept as history and cannot be deleted.
    async fn delete_draft(&self, id: EstimateId) -> Result<(), FulfillmentError>;
}

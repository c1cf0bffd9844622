use crate::{
    db_types::{CarrierId, Estimate, EstimateId, Matching, MatchingId, RejectedMatching},
    traits::{FulfillmentError, Pagination},
};

/// The matching engine backend. It pairs estimates with carriers and keeps the rejection ledger.
#[allow(async_fn_in_trait)]
pub trait MatchingManagement {
    /// Fetches the estimates that `carrier` may accept or reject: submitted, not matched, not ordered, and not
    /// previously rejected by this carrier. Results are sorted by estimate id, descending.
    async fn fetch_candidates(&self, carrier: CarrierId, page: Pagination) -> Result<Vec<Estimate>, FulfillmentError>;

    /// Accepts `estimate` on behalf of `carrier` in a single atomic transaction:
    /// * The estimate is marked as matched. This is a conditional write and is the first statement of the
    ///   transaction, so concurrent accepts on the same estimate serialise here and exactly one succeeds.
    /// * The open candidacy is claimed by the carrier, or a new accepted matching is created if none is open.
    ///
    /// ## Failure modes:
    /// * `EstimateNotFound` if the estimate does not exist.
    /// * `EstimateIsDraft` if the estimate has not been submitted.
    /// * `EstimateAlreadyMatched` if any carrier has already accepted the estimate.
    async fn accept_estimate(&self, estimate: EstimateId, carrier: CarrierId) -> Result<Matching, FulfillmentError>;

    /// Records that `carrier` declined `estimate`. Neither the estimate nor any matching row is modified.
    ///
    /// ## Failure modes:
    /// * `EstimateNotFound` if the estimate does not exist.
    /// * `EstimateIsDraft` / `EstimateNoLongerOpen` if the estimate is a draft, or already matched.
    /// * `DuplicateRejection` if the carrier has already rejected the estimate.
    async fn reject_estimate(
        &self,
        estimate: EstimateId,
        carrier: CarrierId,
    ) -> Result<RejectedMatching, FulfillmentError>;

    async fn fetch_matching(&self, id: MatchingId) -> Result<Option<Matching>, FulfillmentError>;

    /// All matching rows for the estimate, oldest first. At most one of them is accepted.
    async fn fetch_matchings_for_estimate(&self, estimate: EstimateId) -> Result<Vec<Matching>, FulfillmentError>;

    async fn fetch_accepted_matching(&self, estimate: EstimateId) -> Result<Option<Matching>, FulfillmentError>;

    async fn fetch_rejections_for_carrier(&self, carrier: CarrierId) -> Result<Vec<RejectedMatching>, FulfillmentError>;
}

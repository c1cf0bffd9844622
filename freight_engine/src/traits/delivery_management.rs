use chrono::{DateTime, Utc};

use crate::{
    db_types::{CarrierId, Delivery, DeliveryId, DeliveryStatus, MatchingId, PaymentId},
    traits::{CarrierDeliveryRow, DeliveryBucket, FulfillmentError, Pagination},
};

#[allow(async_fn_in_trait)]
pub trait DeliveryManagement {
    /// Creates the `PENDING` delivery for a payment. The carrier is copied from the accepted matching.
    ///
    /// ## Failure modes:
    /// * `PaymentNotFound` if the payment does not exist.
    /// * `DeliveryAlreadyExists` if the payment already has a delivery.
    async fn insert_delivery(&self, payment: PaymentId) -> Result<Delivery, FulfillmentError>;

    async fn fetch_delivery(&self, id: DeliveryId) -> Result<Option<Delivery>, FulfillmentError>;

    async fn fetch_delivery_for_payment(&self, payment: PaymentId) -> Result<Option<Delivery>, FulfillmentError>;

    async fn fetch_delivery_for_matching(&self, matching: MatchingId) -> Result<Option<Delivery>, FulfillmentError>;

    /// Compare-and-set status update. The row is only written if its status is still `expected`.
    /// `completed_at` is written alongside the status.
    ///
    /// Returns `None` if the status no longer matched `expected`, in which case nothing was changed.
    async fn update_delivery_status(
        &self,
        id: DeliveryId,
        expected: DeliveryStatus,
        new_status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Delivery>, FulfillmentError>;

    /// The carrier's deliveries in the given bucket, newest matching first.
    async fn fetch_carrier_deliveries(
        &self,
        carrier: CarrierId,
        bucket: DeliveryBucket,
        page: Pagination,
    ) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError>;
}

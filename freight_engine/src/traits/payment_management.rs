use crate::{
    db_types::{MatchingId, OrderSheetId, Payment, PaymentId, PaymentMethod, PaymentStatus},
    traits::{FulfillmentError, InsertPaymentResult},
};

#[allow(async_fn_in_trait)]
pub trait PaymentManagement {
    /// Records a payment against an order sheet. When `open_delivery` is true, the `PENDING` delivery for the
    /// payment is created in the same transaction.
    ///
    /// ## Failure modes:
    /// * `OrderSheetNotFound` if the order sheet does not exist.
    /// * `PaymentAlreadyExists` if the order sheet already has a payment.
    async fn insert_payment(
        &self,
        order_sheet: OrderSheetId,
        method: PaymentMethod,
        status: PaymentStatus,
        open_delivery: bool,
    ) -> Result<InsertPaymentResult, FulfillmentError>;

    async fn fetch_payment(&self, id: PaymentId) -> Result<Option<Payment>, FulfillmentError>;

    async fn fetch_payment_for_order_sheet(&self, order_sheet: OrderSheetId)
        -> Result<Option<Payment>, FulfillmentError>;

    async fn fetch_payment_for_matching(&self, matching: MatchingId) -> Result<Option<Payment>, FulfillmentError>;
}

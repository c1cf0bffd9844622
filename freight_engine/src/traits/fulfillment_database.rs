use crate::traits::{
    DeliveryManagement,
    EstimateManagement,
    FulfillmentError,
    MatchingManagement,
    OrderManagement,
    PaymentManagement,
    ProfileManagement,
};

/// Everything a backend must provide to run the whole fulfillment pipeline.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase:
    Clone
    + EstimateManagement
    + MatchingManagement
    + OrderManagement
    + PaymentManagement
    + DeliveryManagement
    + ProfileManagement
{
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), FulfillmentError> {
        Ok(())
    }
}

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Estimate, EstimateId, NewEstimate},
    fe_api::acting_shipper,
    traits::{EstimateManagement, FulfillmentError, Pagination},
};

/// `EstimateApi` is how shippers manage their estimates.
pub struct EstimateApi<B> {
    db: B,
}

impl<B: Debug> Debug for EstimateApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EstimateApi ({:?})", self.db)
    }
}

impl<B> EstimateApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> EstimateApi<B>
where B: EstimateManagement
{
    /// Stores a new estimate for the acting shipper. The cost breakdown comes from the pricing collaborator and is
    /// stored as given, with the total being the sum of its parts.
    pub async fn create_estimate(&self, actor: Actor, estimate: NewEstimate) -> Result<Estimate, FulfillmentError> {
        let shipper = acting_shipper(actor)?;
        validate_new_estimate(&estimate)?;
        let estimate = self.db.insert_estimate(shipper, estimate).await?;
        info!("🔄️📝️ {shipper} created {} for {}", estimate.id, estimate.total_cost);
        Ok(estimate)
    }

    pub async fn fetch_estimate(&self, id: EstimateId) -> Result<Estimate, FulfillmentError> {
        self.db.fetch_estimate(id).await?.ok_or(FulfillmentError::EstimateNotFound(id))
    }

    pub async fn estimates_for_shipper(&self, actor: Actor, page: Pagination) -> Result<Vec<Estimate>, FulfillmentError> {
        let shipper = acting_shipper(actor)?;
        self.db.fetch_estimates_for_shipper(shipper, page).await
    }

    /// Submits a draft, making it visible to carriers.
    pub async fn submit_estimate(&self, id: EstimateId, actor: Actor) -> Result<Estimate, FulfillmentError> {
        self.owned_estimate(id, actor).await?;
        let estimate = self.db.submit_estimate(id).await?;
        info!("🔄️📝️ {id} submitted by {actor}");
        Ok(estimate)
    }

    pub async fn delete_draft(&self, id: EstimateId, actor: Actor) -> Result<(), FulfillmentError> {
        self.owned_estimate(id, actor).await?;
        self.db.delete_draft(id).await?;
        info!("🔄️📝️ Draft {id} deleted by {actor}");
        Ok(())
    }

    async fn owned_estimate(&self, id: EstimateId, actor: Actor) -> Result<Estimate, FulfillmentError> {
        let shipper = acting_shipper(actor)?;
        let estimate = self.fetch_estimate(id).await?;
        if estimate.shipper_id != shipper {
            warn!("🔄️📝️ {actor} tried to modify {id}, which belongs to {}", estimate.shipper_id);
            return Err(FulfillmentError::NotEstimateOwner(id));
        }
        Ok(estimate)
    }
}

pub fn validate_new_estimate(estimate: &NewEstimate) -> Result<(), FulfillmentError> {
    if estimate.weight_kg <= 0 {
        return Err(FulfillmentError::InvalidInput(format!("Weight must be positive, got {}", estimate.weight_kg)));
    }
    if estimate.origin_address.trim().is_empty() || estimate.destination_address.trim().is_empty() {
        return Err(FulfillmentError::InvalidInput("Origin and destination addresses are required".into()));
    }
    if estimate.cargo_type.trim().is_empty() {
        return Err(FulfillmentError::InvalidInput("A cargo type is required".into()));
    }
    if estimate.cost.has_negative_component() {
        return Err(FulfillmentError::InvalidInput("Cost components cannot be negative".into()));
    }
    if estimate.cost.total().is_none() {
        return Err(FulfillmentError::InvalidInput("The total cost is too large".into()));
    }
    Ok(())
}

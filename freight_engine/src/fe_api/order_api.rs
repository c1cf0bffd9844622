use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Estimate, Matching, MatchingId, OrderSheet, OrderSheetId, RecipientDetails},
    fe_api::{acting_shipper, objects::OrderForm},
    traits::{EstimateManagement, FulfillmentError, MatchingManagement, OrderManagement, ProfileManagement},
};

/// `OrderApi` turns an accepted matching into exactly one order sheet.
pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderApi<B>
where B: EstimateManagement + MatchingManagement + OrderManagement + ProfileManagement
{
    /// Assembles the order form for a matching. Both the shipper that owns the estimate and the carrier that accepted
    /// it may read it.
    pub async fn load_order_form(&self, matching: MatchingId, actor: Actor) -> Result<OrderForm, FulfillmentError> {
        let (matching, estimate) = self.matching_with_estimate(matching).await?;
        let is_party = match actor {
            Actor::Shipper(id) => estimate.shipper_id == id,
            Actor::Carrier(id) => matching.carrier_id == Some(id),
        };
        if !is_party {
            return Err(FulfillmentError::NotAParty(matching.id));
        }
        let shipper = self
            .db
            .fetch_shipper(estimate.shipper_id)
            .await?
            .ok_or(FulfillmentError::ShipperNotFound(estimate.shipper_id))?;
        let carrier = match matching.carrier_id {
            Some(id) => self.db.fetch_carrier(id).await?,
            None => None,
        };
        let order = self.db.fetch_order_sheet_for_matching(matching.id).await?;
        let cost = estimate.cost();
        let total_cost = estimate.total_cost;
        Ok(OrderForm { matching, estimate, shipper, carrier, cost, total_cost, order })
    }

    /// Confirms the order for an accepted matching. Only the shipper that owns the estimate may do this, and it can
    /// only happen once per matching: later attempts fail with `OrderAlreadyExists`.
    pub async fn create_order(
        &self,
        matching: MatchingId,
        recipient: RecipientDetails,
        actor: Actor,
    ) -> Result<OrderSheet, FulfillmentError> {
        let shipper = acting_shipper(actor)?;
        validate_recipient(&recipient)?;
        let (_, estimate) = self.matching_with_estimate(matching).await?;
        if estimate.shipper_id != shipper {
            warn!("🔄️📦️ {actor} tried to order {matching}, which belongs to {}", estimate.shipper_id);
            return Err(FulfillmentError::NotEstimateOwner(estimate.id));
        }
        let order = self.db.insert_order_sheet(matching, recipient).await?;
        info!("🔄️📦️ Order {} confirmed for {matching}", order.order_code);
        Ok(order)
    }

    pub async fn fetch_order_sheet(&self, id: OrderSheetId) -> Result<OrderSheet, FulfillmentError> {
        self.db.fetch_order_sheet(id).await?.ok_or(FulfillmentError::OrderSheetNotFound(id))
    }

    pub async fn order_sheet_for_matching(&self, matching: MatchingId) -> Result<Option<OrderSheet>, FulfillmentError> {
        self.db.fetch_order_sheet_for_matching(matching).await
    }

    async fn matching_with_estimate(&self, id: MatchingId) -> Result<(Matching, Estimate), FulfillmentError> {
        let matching = self.db.fetch_matching(id).await?.ok_or(FulfillmentError::MatchingNotFound(id))?;
        let estimate = self.db.fetch_estimate(matching.estimate_id).await?.ok_or_else(|| {
            error!("🔄️📦️ {id} refers to {}, which does not exist", matching.estimate_id);
            FulfillmentError::EstimateNotFound(matching.estimate_id)
        })?;
        Ok((matching, estimate))
    }
}

pub fn validate_recipient(recipient: &RecipientDetails) -> Result<(), FulfillmentError> {
    if recipient.recipient_name.trim().is_empty() {
        return Err(FulfillmentError::InvalidInput("A recipient name is required".into()));
    }
    if recipient.recipient_phone.trim().is_empty() {
        return Err(FulfillmentError::InvalidInput("A recipient phone number is required".into()));
    }
    if let Some(email) = &recipient.recipient_email {
        if !email.contains('@') {
            return Err(FulfillmentError::InvalidInput(format!("{email} is not an email address")));
        }
    }
    Ok(())
}

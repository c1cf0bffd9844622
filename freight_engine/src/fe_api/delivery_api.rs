use std::fmt::Debug;

use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Actor, CarrierId, Delivery, DeliveryId, DeliveryStatus, MatchingId, PaymentId, StatusChange},
    events::{DeliveryCompletedEvent, EventProducers},
    fe_api::acting_carrier,
    traits::{
        CarrierDeliveryRow,
        DeliveryBucket,
        DeliveryManagement,
        FulfillmentError,
        MatchingManagement,
        OrderManagement,
        Pagination,
        PaymentManagement,
    },
};

/// How strictly the delivery state machine is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    /// Allow `PENDING -> COMPLETED` without passing through `IN_TRANSIT`.
    pub allow_complete_from_pending: bool,
    /// When a status change is requested by matching and the paid order has no delivery yet, create the `PENDING`
    /// delivery first instead of failing.
    pub create_missing_delivery: bool,
}

/// `DeliveryApi` drives the delivery state machine (`PENDING -> IN_TRANSIT -> COMPLETED`) and provides the carrier's
/// reporting views.
pub struct DeliveryApi<B> {
    db: B,
    producers: EventProducers,
    policy: DeliveryPolicy,
}

impl<B> Debug for DeliveryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeliveryApi ({:?})", self.policy)
    }
}

impl<B> DeliveryApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, policy: DeliveryPolicy::default() }
    }

    pub fn with_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> DeliveryApi<B>
where B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement
{
    /// Explicitly opens the `PENDING` delivery for a payment. Deliveries are normally opened when the payment is
    /// accepted, in which case this fails with `DeliveryAlreadyExists`.
    pub async fn create_delivery(&self, payment: PaymentId, actor: Actor) -> Result<Delivery, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let payment = self.db.fetch_payment(payment).await?.ok_or(FulfillmentError::PaymentNotFound(payment))?;
        let order = self
            .db
            .fetch_order_sheet(payment.order_sheet_id)
            .await?
            .ok_or(FulfillmentError::OrderSheetNotFound(payment.order_sheet_id))?;
        let matching = self
            .db
            .fetch_matching(order.matching_id)
            .await?
            .ok_or(FulfillmentError::MatchingNotFound(order.matching_id))?;
        if !matching.is_accepted_by(carrier) {
            return Err(FulfillmentError::NotAssignedCarrier(matching.id));
        }
        let delivery = self.db.insert_delivery(payment.id).await?;
        info!("🔄️🚚️ {} opened for {} by {carrier}", delivery.id, payment.id);
        Ok(delivery)
    }

    pub async fn fetch_delivery(&self, id: DeliveryId) -> Result<Delivery, FulfillmentError> {
        self.db.fetch_delivery(id).await?.ok_or(FulfillmentError::DeliveryNotFound(id))
    }

    pub async fn mark_in_transit(&self, id: DeliveryId, actor: Actor) -> Result<Delivery, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let delivery = self.fetch_delivery(id).await?;
        self.transition(delivery, carrier, DeliveryStatus::InTransit).await
    }

    pub async fn mark_completed(&self, id: DeliveryId, actor: Actor) -> Result<Delivery, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let delivery = self.fetch_delivery(id).await?;
        self.transition(delivery, carrier, DeliveryStatus::Completed).await
    }

    pub async fn mark_in_transit_for_matching(
        &self,
        matching: MatchingId,
        actor: Actor,
    ) -> Result<Delivery, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let delivery = self.delivery_for_matching(matching, carrier).await?;
        self.transition(delivery, carrier, DeliveryStatus::InTransit).await
    }

    pub async fn mark_completed_for_matching(
        &self,
        matching: MatchingId,
        actor: Actor,
    ) -> Result<Delivery, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let delivery = self.delivery_for_matching(matching, carrier).await?;
        self.transition(delivery, carrier, DeliveryStatus::Completed).await
    }

    /// Accepted jobs of the acting carrier that have not been paid for yet.
    pub async fn unpaid(&self, actor: Actor, page: Pagination) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError> {
        self.deliveries(actor, DeliveryBucket::Unpaid, page).await
    }

    /// Paid jobs of the acting carrier that have not been completed yet.
    pub async fn paid_in_progress(
        &self,
        actor: Actor,
        page: Pagination,
    ) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError> {
        self.deliveries(actor, DeliveryBucket::InProgress, page).await
    }

    pub async fn completed(&self, actor: Actor, page: Pagination) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError> {
        self.deliveries(actor, DeliveryBucket::Completed, page).await
    }

    pub async fn deliveries(
        &self,
        actor: Actor,
        bucket: DeliveryBucket,
        page: Pagination,
    ) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        self.db.fetch_carrier_deliveries(carrier, bucket, page).await
    }

    async fn transition(
        &self,
        delivery: Delivery,
        carrier: CarrierId,
        target: DeliveryStatus,
    ) -> Result<Delivery, FulfillmentError> {
        if delivery.carrier_id != carrier {
            warn!("🔄️🚚️ {carrier} tried to update {}, which belongs to {}", delivery.id, delivery.carrier_id);
            return Err(FulfillmentError::NotDeliveryCarrier(delivery.id));
        }
        let change = delivery.status.transition_to(target, self.policy.allow_complete_from_pending).map_err(|e| {
            debug!("🔄️🚚️ {} refused: {e}", delivery.id);
            FulfillmentError::from(e)
        })?;
        let new_status = match change {
            StatusChange::Unchanged => {
                debug!("🔄️🚚️ {} is already {target}. Nothing to do.", delivery.id);
                return Ok(delivery);
            },
            StatusChange::Apply(status) => status,
        };
        let completed_at = new_status.is_terminal().then(Utc::now);
        let updated = match self.db.update_delivery_status(delivery.id, delivery.status, new_status, completed_at).await? {
            Some(updated) => updated,
            None => return self.settle_lost_update(delivery, target).await,
        };
        info!("🔄️🚚️ {} moved from {} to {}", updated.id, delivery.status, updated.status);
        if updated.status.is_terminal() {
            for emitter in &self.producers.delivery_completed_producer {
                debug!("🔄️🚚️ Notifying delivery completed hook subscribers");
                emitter.publish_event(DeliveryCompletedEvent::new(updated.clone())).await;
            }
        }
        Ok(updated)
    }

    /// Another request changed the delivery first. If it already reached `target` the current row is returned, and the
    /// completion hook is left to the request that won.
    async fn settle_lost_update(&self, stale: Delivery, target: DeliveryStatus) -> Result<Delivery, FulfillmentError> {
        let lost = || {
            warn!("🔄️🚚️ {} changed while moving it from {} to {target}", stale.id, stale.status);
            FulfillmentError::ConcurrentModification(stale.id)
        };
        let Some(fresh) = self.db.fetch_delivery(stale.id).await? else {
            return Err(lost());
        };
        match fresh.status.transition_to(target, self.policy.allow_complete_from_pending) {
            Ok(StatusChange::Unchanged) => {
                debug!("🔄️🚚️ {} was moved to {target} by another request", fresh.id);
                Ok(fresh)
            },
            _ => Err(lost()),
        }
    }

    async fn delivery_for_matching(&self, id: MatchingId, carrier: CarrierId) -> Result<Delivery, FulfillmentError> {
        let matching = self.db.fetch_matching(id).await?.ok_or(FulfillmentError::MatchingNotFound(id))?;
        if !matching.is_accepted {
            return Err(FulfillmentError::MatchingNotAccepted(id));
        }
        if !matching.is_accepted_by(carrier) {
            return Err(FulfillmentError::NotAssignedCarrier(id));
        }
        if let Some(delivery) = self.db.fetch_delivery_for_matching(id).await? {
            return Ok(delivery);
        }
        let payment = self.db.fetch_payment_for_matching(id).await?.ok_or(FulfillmentError::PaymentRequired(id))?;
        if !self.policy.create_missing_delivery {
            return Err(FulfillmentError::DeliveryNotCreated(id));
        }
        match self.db.insert_delivery(payment.id).await {
            Ok(delivery) => {
                info!("🔄️🚚️ {} opened on demand for {id}", delivery.id);
                Ok(delivery)
            },
            // Someone else opened it in the meantime
            Err(FulfillmentError::DeliveryAlreadyExists(_)) => {
                self.db.fetch_delivery_for_payment(payment.id).await?.ok_or(FulfillmentError::DeliveryNotCreated(id))
            },
            Err(e) => Err(e),
        }
    }
}

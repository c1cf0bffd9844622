use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Estimate, Matching, OrderSheet, OrderSheetId, Payment, PaymentId, PaymentMethod, PaymentStatus},
    events::{EventProducers, PaymentAcceptedEvent},
    fe_api::{
        acting_shipper,
        objects::{AcceptedPayment, PaymentSummary},
    },
    traits::{
        DeliveryManagement,
        EstimateManagement,
        FulfillmentError,
        MatchingManagement,
        OrderManagement,
        PaymentManagement,
        ProfileManagement,
    },
};

/// `PaymentApi` records the single payment for a confirmed order. The system does not move any money: it only
/// records that the payment happened.
pub struct PaymentApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B> PaymentApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> PaymentApi<B>
where B: EstimateManagement
        + MatchingManagement
        + OrderManagement
        + PaymentManagement
        + DeliveryManagement
        + ProfileManagement
{
    /// Records payment for an order sheet, and opens its `PENDING` delivery in the same transaction.
    ///
    /// Once the payment is committed, the payment accepted hook is notified. Hook failures never affect the result.
    ///
    /// ## Failure modes:
    /// * `OrderSheetNotFound` if the order sheet does not exist.
    /// * `NotEstimateOwner` if the actor is not the shipper that owns the order.
    /// * `PaymentAlreadyExists` if the order has already been paid.
    pub async fn accept_payment(
        &self,
        order_sheet: OrderSheetId,
        method: PaymentMethod,
        actor: Actor,
    ) -> Result<AcceptedPayment, FulfillmentError> {
        let shipper = acting_shipper(actor)?;
        let (order, _, estimate) = self.order_chain(order_sheet).await?;
        if estimate.shipper_id != shipper {
            warn!("🔄️💰️ {actor} tried to pay for {order_sheet}, which belongs to {}", estimate.shipper_id);
            return Err(FulfillmentError::NotEstimateOwner(estimate.id));
        }
        let result = self.db.insert_payment(order_sheet, method, PaymentStatus::Paid, true).await?;
        info!("🔄️💰️ {} of {} accepted for order {} via {method}", result.payment.id, estimate.total_cost, order.order_code);
        for emitter in &self.producers.payment_accepted_producer {
            debug!("🔄️💰️ Notifying payment accepted hook subscribers");
            let event = PaymentAcceptedEvent::new(order.clone(), result.payment.clone(), result.delivery.clone());
            emitter.publish_event(event).await;
        }
        Ok(AcceptedPayment { payment: result.payment, delivery: result.delivery })
    }

    pub async fn fetch_payment(&self, id: PaymentId) -> Result<Payment, FulfillmentError> {
        self.db.fetch_payment(id).await?.ok_or(FulfillmentError::PaymentNotFound(id))
    }

    /// Assembles the payment confirmation. The shipper and the carrier of the order may both read it.
    pub async fn complete(&self, payment: PaymentId, actor: Actor) -> Result<PaymentSummary, FulfillmentError> {
        let payment = self.fetch_payment(payment).await?;
        let (order, matching, estimate) = self.order_chain(payment.order_sheet_id).await?;
        let is_party = match actor {
            Actor::Shipper(id) => estimate.shipper_id == id,
            Actor::Carrier(id) => matching.carrier_id == Some(id),
        };
        if !is_party {
            return Err(FulfillmentError::NotAParty(matching.id));
        }
        let carrier_id = matching.carrier_id.ok_or(FulfillmentError::MatchingNotAccepted(matching.id))?;
        let carrier = self.db.fetch_carrier(carrier_id).await?.ok_or(FulfillmentError::CarrierNotFound(carrier_id))?;
        let delivery_status = self.db.fetch_delivery_for_payment(payment.id).await?.map(|d| d.status);
        Ok(PaymentSummary {
            payment_id: payment.id,
            order_code: order.order_code,
            recipient_name: order.recipient_name,
            recipient_phone: order.recipient_phone,
            recipient_email: order.recipient_email,
            origin_address: estimate.origin_address,
            destination_address: estimate.destination_address,
            cargo_type: estimate.cargo_type,
            carrier_name: carrier.name,
            carrier_phone: carrier.phone,
            total_cost: estimate.total_cost,
            method: payment.method,
            status: payment.status,
            paid_at: payment.paid_at,
            delivery_status,
        })
    }

    async fn order_chain(&self, id: OrderSheetId) -> Result<(OrderSheet, Matching, Estimate), FulfillmentError> {
        let order = self.db.fetch_order_sheet(id).await?.ok_or(FulfillmentError::OrderSheetNotFound(id))?;
        let matching = self
            .db
            .fetch_matching(order.matching_id)
            .await?
            .ok_or(FulfillmentError::MatchingNotFound(order.matching_id))?;
        let estimate = self
            .db
            .fetch_estimate(matching.estimate_id)
            .await?
            .ok_or(FulfillmentError::EstimateNotFound(matching.estimate_id))?;
        Ok((order, matching, estimate))
    }
}

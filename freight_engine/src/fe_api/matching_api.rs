use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Estimate, EstimateId, Matching, MatchingId, RejectedMatching},
    events::{EstimateMatchedEvent, EventProducers},
    fe_api::acting_carrier,
    traits::{EstimateManagement, FulfillmentError, MatchingManagement, Pagination},
};

/// `MatchingApi` surfaces open estimates to carriers and records their accept/reject decisions.
pub struct MatchingApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for MatchingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchingApi")
    }
}

impl<B> MatchingApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> MatchingApi<B>
where B: EstimateManagement + MatchingManagement
{
    /// Estimates the acting carrier can still accept or reject. Anything the carrier has rejected is never listed
    /// again.
    pub async fn list_candidates(&self, actor: Actor, page: Pagination) -> Result<Vec<Estimate>, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let candidates = self.db.fetch_candidates(carrier, page).await?;
        trace!("🔄️🤝️ {} candidates for {carrier}", candidates.len());
        Ok(candidates)
    }

    /// Accepts the estimate for the acting carrier. Exactly one carrier can ever accept a given estimate; every other
    /// attempt fails with `EstimateAlreadyMatched`.
    pub async fn accept(&self, estimate: EstimateId, actor: Actor) -> Result<Matching, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let matching = self.db.accept_estimate(estimate, carrier).await?;
        info!("🔄️🤝️ {carrier} accepted {estimate} ({})", matching.id);
        self.call_estimate_matched_hook(estimate, &matching).await;
        Ok(matching)
    }

    /// Records that the acting carrier declined the estimate.
    pub async fn reject(&self, estimate: EstimateId, actor: Actor) -> Result<RejectedMatching, FulfillmentError> {
        let carrier = acting_carrier(actor)?;
        let rejection = self.db.reject_estimate(estimate, carrier).await?;
        info!("🔄️🤝️ {carrier} rejected {estimate}");
        Ok(rejection)
    }

    pub async fn is_estimate_matched(&self, estimate: EstimateId) -> Result<bool, FulfillmentError> {
        let estimate = self.db.fetch_estimate(estimate).await?.ok_or(FulfillmentError::EstimateNotFound(estimate))?;
        Ok(estimate.matched)
    }

    pub async fn fetch_matching(&self, id: MatchingId) -> Result<Matching, FulfillmentError> {
        self.db.fetch_matching(id).await?.ok_or(FulfillmentError::MatchingNotFound(id))
    }

    pub async fn matchings_for_estimate(&self, estimate: EstimateId) -> Result<Vec<Matching>, FulfillmentError> {
        self.db.fetch_matchings_for_estimate(estimate).await
    }

    async fn call_estimate_matched_hook(&self, estimate: EstimateId, matching: &Matching) {
        if self.producers.estimate_matched_producer.is_empty() {
            return;
        }
        let estimate = match self.db.fetch_estimate(estimate).await {
            Ok(Some(e)) => e,
            Ok(None) => {
                error!("🔄️🤝️ {estimate} was matched but can no longer be found. Not publishing the event.");
                return;
            },
            Err(e) => {
                warn!("🔄️🤝️ Could not load {estimate} for the matched event: {e}");
                return;
            },
        };
        for emitter in &self.producers.estimate_matched_producer {
            debug!("🔄️🤝️ Notifying estimate matched hook subscribers");
            emitter.publish_event(EstimateMatchedEvent::new(estimate.clone(), matching.clone())).await;
        }
    }
}

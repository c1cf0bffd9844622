use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{
    DeliveryCompletedEvent,
    EstimateMatchedEvent,
    EventHandler,
    EventProducer,
    Handler,
    PaymentAcceptedEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub estimate_matched_producer: Vec<EventProducer<EstimateMatchedEvent>>,
    pub payment_accepted_producer: Vec<EventProducer<PaymentAcceptedEvent>>,
    pub delivery_completed_producer: Vec<EventProducer<DeliveryCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_estimate_matched: Option<EventHandler<EstimateMatchedEvent>>,
    pub on_payment_accepted: Option<EventHandler<PaymentAcceptedEvent>>,
    pub on_delivery_completed: Option<EventHandler<DeliveryCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_estimate_matched = hooks.on_estimate_matched.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_accepted = hooks.on_payment_accepted.map(|f| EventHandler::new(buffer_size, f));
        let on_delivery_completed = hooks.on_delivery_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_estimate_matched, on_payment_accepted, on_delivery_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_estimate_matched {
            result.estimate_matched_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_accepted {
            result.payment_accepted_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_delivery_completed {
            result.delivery_completed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns one consumer task per registered hook.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_estimate_matched {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_accepted {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_delivery_completed {
            tokio::spawn(handler.start_handler());
        }
        debug!("📬️ Event handlers started");
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_estimate_matched: Option<Handler<EstimateMatchedEvent>>,
    pub on_payment_accepted: Option<Handler<PaymentAcceptedEvent>>,
    pub on_delivery_completed: Option<Handler<DeliveryCompletedEvent>>,
}

impl EventHooks {
    pub fn on_estimate_matched<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(EstimateMatchedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_estimate_matched = Some(Arc::new(f));
        self
    }

    pub fn on_payment_accepted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentAcceptedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_payment_accepted = Some(Arc::new(f));
        self
    }

    pub fn on_delivery_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DeliveryCompletedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_delivery_completed = Some(Arc::new(f));
        self
    }
}

use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use freight_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    DeliveryApi,
    EstimateApi,
    MatchingApi,
    OrderApi,
    PaymentApi,
    SqliteDatabase,
};
use futures::FutureExt;
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AcceptEstimateRoute,
        AcceptPaymentRoute,
        CandidatesRoute,
        CarrierDeliveriesRoute,
        CreateDeliveryRoute,
        CreateEstimateRoute,
        CreateOrderRoute,
        DeleteDraftRoute,
        EstimateMatchedRoute,
        EstimateRoute,
        MarkCompletedRoute,
        MarkInTransitRoute,
        MatchingCompletedRoute,
        MatchingInTransitRoute,
        MyEstimatesRoute,
        OrderFormRoute,
        PaymentSummaryRoute,
        RejectEstimateRoute,
        SubmitEstimateRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database is ready at {}", config.database_url);
    let handlers = EventHandlers::new(config.event_buffer_size, notification_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The notification collaborator. Delivery of these messages is best-effort, so for now they are written to the log.
pub fn notification_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_estimate_matched(|ev| {
            async move {
                info!(
                    "📬️ Notify {}: {} was accepted by {:?}",
                    ev.estimate.shipper_id, ev.estimate.id, ev.matching.carrier_id
                );
            }
            .boxed()
        })
        .on_payment_accepted(|ev| {
            async move {
                info!("📬️ Notify carrier: order {} has been paid ({})", ev.order.order_code, ev.payment.method);
            }
            .boxed()
        })
        .on_delivery_completed(|ev| {
            async move {
                info!("📬️ Notify shipper: {} completed", ev.delivery.id);
            }
            .boxed()
        });
    hooks
}

/// Malformed or mistyped JSON bodies are reported in the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        debug!("💻️ Could not read the body of {} {}. {err}", req.method(), req.path());
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let estimates_api = EstimateApi::new(db.clone());
        let matching_api = MatchingApi::new(db.clone(), producers.clone());
        let orders_api = OrderApi::new(db.clone());
        let payments_api = PaymentApi::new(db.clone(), producers.clone());
        let deliveries_api = DeliveryApi::new(db.clone(), producers.clone()).with_policy(config.delivery_policy);
        let api_scope = web::scope("/api")
            .service(CreateEstimateRoute::<SqliteDatabase>::new())
            .service(MyEstimatesRoute::<SqliteDatabase>::new())
            .service(EstimateMatchedRoute::<SqliteDatabase>::new())
            .service(SubmitEstimateRoute::<SqliteDatabase>::new())
            .service(AcceptEstimateRoute::<SqliteDatabase>::new())
            .service(RejectEstimateRoute::<SqliteDatabase>::new())
            .service(EstimateRoute::<SqliteDatabase>::new())
            .service(DeleteDraftRoute::<SqliteDatabase>::new())
            .service(CandidatesRoute::<SqliteDatabase>::new())
            .service(OrderFormRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(AcceptPaymentRoute::<SqliteDatabase>::new())
            .service(PaymentSummaryRoute::<SqliteDatabase>::new())
            .service(CreateDeliveryRoute::<SqliteDatabase>::new())
            .service(MarkInTransitRoute::<SqliteDatabase>::new())
            .service(MarkCompletedRoute::<SqliteDatabase>::new())
            .service(MatchingInTransitRoute::<SqliteDatabase>::new())
            .service(MatchingCompletedRoute::<SqliteDatabase>::new())
            .service(CarrierDeliveriesRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fps::access_log"))
            .app_data(web::Data::new(estimates_api))
            .app_data(web::Data::new(matching_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(deliveries_api))
            .app_data(web::Data::new(config.paging))
            .app_data(json_config())
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use freight_engine::{
    db_types::{CarrierId, DeliveryId, DeliveryStatus},
    events::EventProducers,
    traits::DeliveryBucket,
    DeliveryApi,
};

use super::{
    helpers::{delivery, get_request, json, post_request, Caller},
    mocks::MockFreightBackend,
};
use crate::{
    config::PagingConfig,
    routes::{CarrierDeliveriesRoute, MarkCompletedRoute, MarkInTransitRoute},
};

#[actix_web::test]
async fn unknown_bucket() {
    let (status, body) = get_request(Caller::Carrier(7), "/deliveries/lost", |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_carrier_deliveries().never();
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Could not read request path"));
}

#[actix_web::test]
async fn in_progress_bucket() {
    let (status, body) = get_request(Caller::Carrier(7), "/deliveries/in_progress", |cfg| {
        let mut backend = MockFreightBackend::new();
        backend
            .expect_fetch_carrier_deliveries()
            .withf(|carrier, bucket, page| {
                *carrier == CarrierId(7) && *bucket == DeliveryBucket::InProgress && page.limit() == 20
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn another_carriers_delivery() {
    let (status, _) = post_request(Caller::Carrier(8), "/deliveries/4/complete", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_delivery().returning(|id| Ok(Some(delivery(id.0, 7, DeliveryStatus::InTransit))));
        backend.expect_update_delivery_status().never();
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn complete_a_delivery_in_transit() {
    let (status, body) = post_request(Caller::Carrier(7), "/deliveries/4/complete", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_delivery().returning(|id| Ok(Some(delivery(id.0, 7, DeliveryStatus::InTransit))));
        backend
            .expect_update_delivery_status()
            .withf(|id, expected, new_status, completed_at| {
                *id == DeliveryId(4) &&
                    *expected == DeliveryStatus::InTransit &&
                    *new_status == DeliveryStatus::Completed &&
                    completed_at.is_some()
            })
            .times(1)
            .returning(|id, _, _, _| Ok(Some(delivery(id.0, 7, DeliveryStatus::Completed))));
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["status"], "COMPLETED");
    assert!(body["completed_at"].is_string());
}

#[actix_web::test]
async fn completing_from_pending_is_refused() {
    let (status, body) = post_request(Caller::Carrier(7), "/deliveries/4/complete", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_delivery().returning(|id| Ok(Some(delivery(id.0, 7, DeliveryStatus::Pending))));
        backend.expect_update_delivery_status().never();
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["error"], "A delivery cannot move from PENDING to COMPLETED");
}

#[actix_web::test]
async fn losing_a_status_race_is_a_conflict() {
    let (status, _) = post_request(Caller::Carrier(7), "/deliveries/4/in_transit", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_delivery().returning(|id| Ok(Some(delivery(id.0, 7, DeliveryStatus::Pending))));
        backend.expect_update_delivery_status().returning(|_, _, _, _| Ok(None));
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn losing_a_race_to_the_same_status_is_not_a_conflict() {
    let (status, body) = post_request(Caller::Carrier(7), "/deliveries/4/complete", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        let mut reads = 0;
        backend.expect_fetch_delivery().times(2).returning(move |id| {
            reads += 1;
            let status = if reads == 1 { DeliveryStatus::InTransit } else { DeliveryStatus::Completed };
            Ok(Some(delivery(id.0, 7, status)))
        });
        backend
            .expect_update_delivery_status()
            .withf(|id, expected, new_status, _| {
                *id == DeliveryId(4) && *expected == DeliveryStatus::InTransit && *new_status == DeliveryStatus::Completed
            })
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["id"], 4);
    assert_eq!(body["status"], "COMPLETED");
}

#[actix_web::test]
async fn losing_a_race_to_a_later_status_is_a_conflict() {
    let (status, body) = post_request(Caller::Carrier(7), "/deliveries/4/in_transit", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        let mut reads = 0;
        backend.expect_fetch_delivery().times(2).returning(move |id| {
            reads += 1;
            let status = if reads == 1 { DeliveryStatus::Pending } else { DeliveryStatus::Completed };
            Ok(Some(delivery(id.0, 7, status)))
        });
        backend.expect_update_delivery_status().times(1).returning(|_, _, _, _| Ok(None));
        configure_deliveries(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["error"], "delivery#4 was modified by another request. Reload and try again.");
}

fn configure_deliveries(cfg: &mut ServiceConfig, backend: MockFreightBackend) {
    let api = DeliveryApi::new(backend, EventProducers::default());
    cfg.service(MarkInTransitRoute::<MockFreightBackend>::new())
        .service(MarkCompletedRoute::<MockFreightBackend>::new())
        .service(CarrierDeliveriesRoute::<MockFreightBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(PagingConfig::default()));
}

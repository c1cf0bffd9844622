use actix_web::{http::StatusCode, web, web::ServiceConfig};
use freight_engine::{
    db_types::{MatchingId, ShipperId},
    FulfillmentError,
    OrderApi,
};
use serde_json::json;

use super::{
    helpers::{accepted_matching, carrier, estimate, get_request, json, order_sheet, post_request, shipper, Caller},
    mocks::MockFreightBackend,
};
use crate::{
    config::PagingConfig,
    routes::{CreateOrderRoute, OrderFormRoute},
    server::json_config,
};

fn recipient() -> serde_json::Value {
    json!({
        "recipient_name": "김수령",
        "recipient_phone": "010-1234-5678",
        "recipient_email": null,
        "origin_detail": "B2 하역장",
        "destination_detail": "3번 게이트"
    })
}

/// Matching 3 is estimate 11 (shipper 1) accepted by carrier 7
fn accepted_chain(backend: &mut MockFreightBackend) {
    backend.expect_fetch_matching().returning(|id| Ok(Some(accepted_matching(id.0, 11, 7))));
    backend.expect_fetch_estimate().returning(|id| Ok(Some(estimate(id.0, 1))));
}

#[actix_web::test]
async fn create_an_order() {
    let (status, body) = post_request(Caller::Shipper(1), "/matchings/3/order", Some(recipient()), |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend
            .expect_insert_order_sheet()
            .withf(|matching, recipient| *matching == MatchingId(3) && recipient.recipient_name == "김수령")
            .times(1)
            .returning(|matching, _| Ok(order_sheet(5, matching.0)));
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let body = json(&body);
    assert_eq!(body["id"], 5);
    assert_eq!(body["matching_id"], 3);
    assert_eq!(body["order_code"], "K7Q2MX");
}

#[actix_web::test]
async fn ordering_a_matching_twice_is_a_conflict() {
    let (status, body) = post_request(Caller::Shipper(1), "/matchings/3/order", Some(recipient()), |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend
            .expect_insert_order_sheet()
            .times(1)
            .returning(|matching, _| Err(FulfillmentError::OrderAlreadyExists(matching)));
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["error"], "An order sheet already exists for matching#3");
}

#[actix_web::test]
async fn only_the_owner_can_order() {
    let (status, body) = post_request(Caller::Shipper(2), "/matchings/3/order", Some(recipient()), |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend.expect_insert_order_sheet().never();
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "Only the shipper that owns estimate#11 may do this");
}

#[actix_web::test]
async fn an_order_needs_a_recipient() {
    let mut body = recipient();
    body["recipient_name"] = json!("  ");
    let (status, body) = post_request(Caller::Shipper(1), "/matchings/3/order", Some(body), |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_insert_order_sheet().never();
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "Invalid input. A recipient name is required");
}

#[actix_web::test]
async fn carriers_cannot_order() {
    let err = post_request(Caller::Carrier(7), "/matchings/3/order", Some(recipient()), |cfg| {
        configure_orders(cfg, MockFreightBackend::new())
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Insufficient permissions. This route is only open to: shipper");
}

#[actix_web::test]
async fn the_carrier_can_read_the_order_form() {
    let (status, body) = get_request(Caller::Carrier(7), "/matchings/3/order_form", |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend
            .expect_fetch_shipper()
            .withf(|id| *id == ShipperId(1))
            .returning(|id| Ok(Some(shipper(id.0))));
        backend.expect_fetch_carrier().returning(|id| Ok(Some(carrier(id.0))));
        backend.expect_fetch_order_sheet_for_matching().returning(|_| Ok(None));
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["matching"]["id"], 3);
    assert_eq!(body["estimate"]["id"], 11);
    assert_eq!(body["shipper"]["name"], "한빛물산");
    assert_eq!(body["carrier"]["vehicle_number"], "서울12가3456");
    assert_eq!(body["cost"]["base_cost"], 120_000);
    assert_eq!(body["total_cost"], 220_000);
    assert!(body["order"].is_null());
}

#[actix_web::test]
async fn the_order_form_shows_a_confirmed_order() {
    let (status, body) = get_request(Caller::Shipper(1), "/matchings/3/order_form", |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend.expect_fetch_shipper().returning(|id| Ok(Some(shipper(id.0))));
        backend.expect_fetch_carrier().returning(|id| Ok(Some(carrier(id.0))));
        backend.expect_fetch_order_sheet_for_matching().returning(|m| Ok(Some(order_sheet(5, m.0))));
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["order"]["order_code"], "K7Q2MX");
}

#[actix_web::test]
async fn outsiders_cannot_read_the_order_form() {
    let (status, body) = get_request(Caller::Carrier(8), "/matchings/3/order_form", |cfg| {
        let mut backend = MockFreightBackend::new();
        accepted_chain(&mut backend);
        backend.expect_fetch_shipper().never();
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "Only the shipper or the carrier of matching#3 may view this");
}

#[actix_web::test]
async fn order_form_for_a_missing_matching() {
    let (status, _) = get_request(Caller::Shipper(1), "/matchings/99/order_form", |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_fetch_matching().returning(|_| Ok(None));
        configure_orders(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_orders(cfg: &mut ServiceConfig, backend: MockFreightBackend) {
    let api = OrderApi::new(backend);
    cfg.service(CreateOrderRoute::<MockFreightBackend>::new())
        .service(OrderFormRoute::<MockFreightBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(PagingConfig::default()))
        .app_data(json_config());
}

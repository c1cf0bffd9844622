use actix_web::{http::StatusCode, web, web::ServiceConfig};
use freight_engine::{
    db_types::{CarrierId, EstimateId},
    events::EventProducers,
    FulfillmentError,
    MatchingApi,
};

use super::{
    helpers::{accepted_matching, estimate, get_request, json, post_request, Caller},
    mocks::MockFreightBackend,
};
use crate::{
    config::PagingConfig,
    routes::{AcceptEstimateRoute, CandidatesRoute, EstimateMatchedRoute, RejectEstimateRoute},
};

#[actix_web::test]
async fn accept_an_estimate() {
    let (status, body) = post_request(Caller::Carrier(7), "/estimates/11/accept", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend
            .expect_accept_estimate()
            .withf(|estimate, carrier| *estimate == EstimateId(11) && *carrier == CarrierId(7))
            .times(1)
            .returning(|estimate, carrier| Ok(accepted_matching(3, estimate.0, carrier.0)));
        configure_matching(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["id"], 3);
    assert_eq!(body["carrier_id"], 7);
    assert_eq!(body["is_accepted"], true);
}

#[actix_web::test]
async fn losing_the_race_is_a_conflict() {
    let (status, body) = post_request(Caller::Carrier(8), "/estimates/11/accept", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_accept_estimate().returning(|estimate, _| Err(FulfillmentError::EstimateAlreadyMatched(estimate)));
        configure_matching(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["error"], "Estimate estimate#11 has already been matched with a carrier");
}

#[actix_web::test]
async fn shippers_cannot_accept() {
    let err = post_request(Caller::Shipper(1), "/estimates/11/accept", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend.expect_accept_estimate().never();
        configure_matching(cfg, backend)
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Insufficient permissions. This route is only open to: carrier");
}

#[actix_web::test]
async fn reject_twice() {
    let (status, _) = post_request(Caller::Carrier(7), "/estimates/11/reject", None, |cfg| {
        let mut backend = MockFreightBackend::new();
        backend
            .expect_reject_estimate()
            .returning(|estimate, carrier| Err(FulfillmentError::DuplicateRejection { estimate, carrier }));
        configure_matching(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn candidates_use_the_default_page_size() {
    let (status, body) = get_request(Caller::Carrier(7), "/candidates", |cfg| {
        let mut backend = MockFreightBackend::new();
        backend
            .expect_fetch_candidates()
            .withf(|carrier, page| *carrier == CarrierId(7) && page.offset() == 0 && page.limit() == 20)
            .times(1)
            .returning(|_, _| Ok(vec![estimate(12, 1), estimate(11, 2)]));
        configure_matching(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn candidates_honour_the_page_query() {
    let (status, body) = get_request(Caller::Carrier(7), "/candidates?offset=5&count=2", |cfg| {
        let mut backend = MockFreightBackend::new();
        backend
            .expect_fetch_candidates()
            .withf(|_, page| page.offset() == 5 && page.limit() == 2)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        configure_matching(cfg, backend)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn matched_status_is_visible_to_both_roles() {
    for caller in [Caller::Shipper(1), Caller::Carrier(9)] {
        let (status, body) = get_request(caller, "/estimates/11/matched", |cfg| {
            let mut backend = MockFreightBackend::new();
            backend.expect_fetch_estimate().returning(|id| {
                let mut e = estimate(id.0, 1);
                e.matched = true;
                Ok(Some(e))
            });
            configure_matching(cfg, backend)
        })
        .await
        .expect("Request failed");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"estimate_id":11,"matched":true}"#);
    }
}

fn configure_matching(cfg: &mut ServiceConfig, backend: MockFreightBackend) {
    let api = MatchingApi::new(backend, EventProducers::default());
    cfg.service(AcceptEstimateRoute::<MockFreightBackend>::new())
        .service(RejectEstimateRoute::<MockFreightBackend>::new())
        .service(CandidatesRoute::<MockFreightBackend>::new())
        .service(EstimateMatchedRoute::<MockFreightBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(PagingConfig::default()));
}

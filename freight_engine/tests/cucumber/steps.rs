use std::str::FromStr;

use cucumber::{given, then, when};
use freight_engine::{
    db_types::{CostBreakdown, DeliveryStatus, NewEstimate, PaymentMethod},
    DeliveryManagement,
    FulfillmentError,
    Pagination,
};

use crate::{
    cucumber::FreightWorld,
    support::{recipient, Pipeline},
};

#[given("a fresh freight store")]
async fn fresh_store(world: &mut FreightWorld) {
    world.system = Some(Pipeline::new().await);
}

#[given(expr = "shipper '{word}' submits an estimate '{word}' for {int} kg of '{word}'")]
async fn submit_estimate(world: &mut FreightWorld, shipper: String, label: String, weight: i64, cargo: String) {
    let actor = world.actor(&shipper);
    let cost = CostBreakdown::new(120_000, 85_000, 15_000);
    let estimate = NewEstimate::new("서울특별시 강남구 테헤란로 152", "부산광역시 해운대구 센텀중앙로 79", weight, cargo.as_str(), cost);
    let estimate = world.sys().estimates.create_estimate(actor, estimate).await.expect("Error creating estimate");
    world.estimates.insert(label, estimate.id);
}

#[when(expr = "carrier '{word}' accepts estimate '{word}'")]
async fn accept(world: &mut FreightWorld, carrier: String, label: String) {
    let actor = world.actor(&carrier);
    let matching = world.sys().matching.accept(world.estimate(&label), actor).await.expect("Error accepting estimate");
    world.matchings.insert(label, matching.id);
}

#[when(expr = "carrier '{word}' rejects estimate '{word}'")]
async fn reject(world: &mut FreightWorld, carrier: String, label: String) {
    let actor = world.actor(&carrier);
    world.sys().matching.reject(world.estimate(&label), actor).await.expect("Error rejecting estimate");
}

#[when(expr = "shipper '{word}' orders estimate '{word}'")]
async fn order(world: &mut FreightWorld, shipper: String, label: String) {
    let actor = world.actor(&shipper);
    world.sys().orders.create_order(world.matching(&label), recipient(), actor).await.expect("Error creating order");
}

#[when(expr = "shipper '{word}' pays for estimate '{word}' by {word}")]
async fn pay(world: &mut FreightWorld, shipper: String, label: String, method: String) {
    let actor = world.actor(&shipper);
    let method = PaymentMethod::from_str(&method).expect("Unknown payment method");
    let sys = world.sys();
    let order = sys.orders.order_sheet_for_matching(world.matching(&label)).await.unwrap().expect("No order sheet");
    sys.payments.accept_payment(order.id, method, actor).await.expect("Error accepting payment");
}

#[when(expr = "carrier '{word}' marks the delivery for estimate '{word}' as {word}")]
async fn mark_delivery(world: &mut FreightWorld, carrier: String, label: String, status: String) {
    let actor = world.actor(&carrier);
    let matching = world.matching(&label);
    let deliveries = &world.sys().deliveries;
    let result = match DeliveryStatus::from_str(&status).expect("Unknown delivery status") {
        DeliveryStatus::InTransit => deliveries.mark_in_transit_for_matching(matching, actor).await,
        DeliveryStatus::Completed => deliveries.mark_completed_for_matching(matching, actor).await,
        DeliveryStatus::Pending => panic!("Deliveries cannot be moved back to PENDING"),
    };
    result.expect("Error updating delivery");
}

#[then(expr = "estimate '{word}' is matched")]
async fn is_matched(world: &mut FreightWorld, label: String) {
    let matched = world.sys().matching.is_estimate_matched(world.estimate(&label)).await.unwrap();
    assert!(matched, "Estimate {label} is not matched");
}

#[then(expr = "estimate '{word}' is not matched")]
async fn is_not_matched(world: &mut FreightWorld, label: String) {
    let matched = world.sys().matching.is_estimate_matched(world.estimate(&label)).await.unwrap();
    assert!(!matched, "Estimate {label} is matched");
}

#[then(expr = "carrier '{word}' {word} estimate '{word}' as a candidate")]
async fn candidate(world: &mut FreightWorld, carrier: String, sees: String, label: String) {
    let actor = world.actor(&carrier);
    let page = Pagination::new(0, 200);
    let candidates = world.sys().matching.list_candidates(actor, page).await.unwrap();
    let listed = candidates.iter().any(|e| e.id == world.estimate(&label));
    match sees.as_str() {
        "sees" => assert!(listed, "{carrier} should see {label}"),
        "misses" => assert!(!listed, "{carrier} should not see {label}"),
        _ => panic!("Expected 'sees' or 'misses', got {sees}"),
    }
}

#[then(expr = "carrier '{word}' cannot accept estimate '{word}' because of {string}")]
async fn cannot_accept(world: &mut FreightWorld, carrier: String, label: String, kind: String) {
    let actor = world.actor(&carrier);
    let err = world.sys().matching.accept(world.estimate(&label), actor).await.unwrap_err();
    assert_kind(&err, &kind);
}

#[then(expr = "carrier '{word}' cannot reject estimate '{word}' because of {string}")]
async fn cannot_reject(world: &mut FreightWorld, carrier: String, label: String, kind: String) {
    let actor = world.actor(&carrier);
    let err = world.sys().matching.reject(world.estimate(&label), actor).await.unwrap_err();
    assert_kind(&err, &kind);
}

#[then(expr = "shipper '{word}' cannot order estimate '{word}' because of {string}")]
async fn cannot_order(world: &mut FreightWorld, shipper: String, label: String, kind: String) {
    let actor = world.actor(&shipper);
    let err = world.sys().orders.create_order(world.matching(&label), recipient(), actor).await.unwrap_err();
    assert_kind(&err, &kind);
}

#[then(expr = "carrier '{word}' cannot mark the delivery for estimate '{word}' as {word} because of {string}")]
async fn cannot_mark(world: &mut FreightWorld, carrier: String, label: String, status: String, kind: String) {
    let actor = world.actor(&carrier);
    let matching = world.matching(&label);
    let deliveries = &world.sys().deliveries;
    let err = match DeliveryStatus::from_str(&status).expect("Unknown delivery status") {
        DeliveryStatus::Completed => deliveries.mark_completed_for_matching(matching, actor).await,
        _ => deliveries.mark_in_transit_for_matching(matching, actor).await,
    }
    .unwrap_err();
    assert_kind(&err, &kind);
}

#[then(expr = "the order for estimate '{word}' has a {int} digit order code")]
async fn order_code(world: &mut FreightWorld, label: String, digits: usize) {
    let order = world.sys().orders.order_sheet_for_matching(world.matching(&label)).await.unwrap().expect("No order");
    let code = order.order_code.as_str();
    assert_eq!(code.len(), digits);
    assert!(code.chars().all(|c| c.is_ascii_digit()), "{code} is not numeric");
}

#[then(expr = "the delivery for estimate '{word}' is {word}")]
async fn delivery_status(world: &mut FreightWorld, label: String, status: String) {
    let expected = DeliveryStatus::from_str(&status).expect("Unknown delivery status");
    let delivery = world
        .sys()
        .db
        .fetch_delivery_for_matching(world.matching(&label))
        .await
        .unwrap()
        .expect("No delivery");
    assert_eq!(delivery.status, expected);
    assert_eq!(delivery.completed_at.is_some(), expected == DeliveryStatus::Completed);
}

fn assert_kind(err: &FulfillmentError, kind: &str) {
    assert_eq!(err.kind().to_string(), kind, "Unexpected error: {err}");
}

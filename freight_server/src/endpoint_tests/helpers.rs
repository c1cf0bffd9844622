use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use freight_engine::db_types::{
    Carrier,
    CarrierId,
    Delivery,
    DeliveryId,
    DeliveryStatus,
    Estimate,
    EstimateId,
    Matching,
    MatchingId,
    OrderCode,
    OrderSheet,
    OrderSheetId,
    Payment,
    PaymentId,
    PaymentMethod,
    PaymentStatus,
    Shipper,
    ShipperId,
    Won,
};
use log::debug;
use serde_json::Value;

use crate::auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

/// Who a test request claims to be
#[derive(Debug, Clone, Copy)]
pub enum Caller {
    Anonymous,
    Shipper(i64),
    Carrier(i64),
    Raw(&'static str, &'static str),
}

impl Caller {
    fn apply(self, req: TestRequest) -> TestRequest {
        let (role, id) = match self {
            Caller::Anonymous => return req,
            Caller::Shipper(id) => ("shipper", id.to_string()),
            Caller::Carrier(id) => ("carrier", id.to_string()),
            Caller::Raw(role, id) => (role, id.to_string()),
        };
        req.insert_header((ACTOR_ROLE_HEADER, role)).insert_header((ACTOR_ID_HEADER, id))
    }
}

pub async fn get_request<F>(caller: Caller, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::get().uri(path), caller, configure).await
}

pub async fn post_request<F>(
    caller: Caller,
    path: &str,
    body: Option<Value>,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path);
    if let Some(body) = body {
        req = req.set_json(body);
    }
    send(req, caller, configure).await
}

pub async fn delete_request<F>(caller: Caller, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::delete().uri(path), caller, configure).await
}

async fn send<F>(req: TestRequest, caller: Caller, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let req = caller.apply(req).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("Response is not JSON")
}

pub fn estimate(id: i64, shipper: i64) -> Estimate {
    let t = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    Estimate {
        id: EstimateId(id),
        shipper_id: ShipperId(shipper),
        origin_address: "서울특별시 강남구 테헤란로 152".into(),
        destination_address: "부산광역시 해운대구 센텀중앙로 79".into(),
        weight_kg: 5000,
        cargo_type: "일반화물".into(),
        start_time: t,
        base_cost: Won::from(120_000),
        distance_cost: Won::from(85_000),
        special_option_cost: Won::from(15_000),
        total_cost: Won::from(220_000),
        is_temp: false,
        matched: false,
        is_ordered: false,
        created_at: t,
        updated_at: t,
    }
}

pub fn accepted_matching(id: i64, estimate: i64, carrier: i64) -> Matching {
    let t = Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap();
    Matching {
        id: MatchingId(id),
        estimate_id: EstimateId(estimate),
        carrier_id: Some(CarrierId(carrier)),
        is_accepted: true,
        accepted_at: Some(t),
        created_at: t,
    }
}

pub fn delivery(id: i64, carrier: i64, status: DeliveryStatus) -> Delivery {
    let t = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    Delivery {
        id: DeliveryId(id),
        payment_id: PaymentId(id),
        carrier_id: CarrierId(carrier),
        status,
        created_at: t,
        updated_at: t,
        completed_at: (status == DeliveryStatus::Completed).then_some(t),
    }
}

pub fn order_sheet(id: i64, matching: i64) -> OrderSheet {
    OrderSheet {
        id: OrderSheetId(id),
        matching_id: MatchingId(matching),
        order_code: OrderCode::from("K7Q2MX".to_string()),
        recipient_name: "김수령".into(),
        recipient_phone: "010-1234-5678".into(),
        recipient_email: None,
        origin_detail: "B2 하역장".into(),
        destination_detail: "3번 게이트".into(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 4, 11, 0, 0).unwrap(),
    }
}

pub fn payment(id: i64, order_sheet: i64, method: PaymentMethod) -> Payment {
    Payment {
        id: PaymentId(id),
        order_sheet_id: OrderSheetId(order_sheet),
        method,
        status: PaymentStatus::Paid,
        paid_at: Utc.with_ymd_and_hms(2024, 3, 4, 11, 15, 0).unwrap(),
    }
}

pub fn shipper(id: i64) -> Shipper {
    Shipper {
        id: ShipperId(id),
        name: "한빛물산".into(),
        phone: "02-555-0101".into(),
        email: Some("logistics@hanbit.example".into()),
        address: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
    }
}

pub fn carrier(id: i64) -> Carrier {
    Carrier {
        id: CarrierId(id),
        name: "박기사".into(),
        phone: "010-9876-5432".into(),
        email: None,
        vehicle_number: Some("서울12가3456".into()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap(),
    }
}

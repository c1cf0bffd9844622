#![allow(dead_code)]


use chrono::{TimeZone, Utc};
use freight_engine::{
    db_types::{
        Actor,
        Carrier,
        CostBreakdown,
        Estimate,
        Matching,
        NewCarrier,
        NewEstimate,
        NewShipper,
        OrderSheet,
        PaymentMethod,
        RecipientDetails,
        Shipper,
    },
    events::EventProducers,
    objects::AcceptedPayment,
    DeliveryApi,
    DeliveryPolicy,
    EstimateApi,
    MatchingApi,
    OrderApi,
    PaymentApi,
    ProfileManagement,
    SqliteDatabase,
};

use self::prepare_env::{prepare_test_env, tear_down};

/// The cast of every pipeline test: two shippers, and three carriers.
#[derive(Debug, Clone)]
pub struct Profiles {
    pub alice: Shipper,
    pub bob: Shipper,
    pub carrier_x: Carrier,
    pub carrier_y: Carrier,
    pub carrier_z: Carrier,
}

impl Profiles {
    pub fn alice(&self) -> Actor {
        Actor::Shipper(self.alice.id)
    }

    pub fn bob(&self) -> Actor {
        Actor::Shipper(self.bob.id)
    }

    pub fn x(&self) -> Actor {
        Actor::Carrier(self.carrier_x.id)
    }

    pub fn y(&self) -> Actor {
        Actor::Carrier(self.carrier_y.id)
    }

    pub fn z(&self) -> Actor {
        Actor::Carrier(self.carrier_z.id)
    }
}

pub async fn seed_profiles(db: &SqliteDatabase) -> Profiles {
    let alice = NewShipper::new("김민지", "010-1234-5678").with_email("minji@example.com");
    let bob = NewShipper::new("Bob Logistics", "010-9876-5432");
    let x = NewCarrier::new("이준호", "010-1111-2222").with_vehicle("12가3456");
    let y = NewCarrier::new("박서연", "010-3333-4444").with_vehicle("34나5678");
    let z = NewCarrier::new("Zed Haulage", "010-5555-6666");
    Profiles {
        alice: db.insert_shipper(alice).await.expect("Error creating shipper"),
        bob: db.insert_shipper(bob).await.expect("Error creating shipper"),
        carrier_x: db.insert_carrier(x).await.expect("Error creating carrier"),
        carrier_y: db.insert_carrier(y).await.expect("Error creating carrier"),
        carrier_z: db.insert_carrier(z).await.expect("Error creating carrier"),
    }
}

pub fn general_cargo(weight_kg: i64) -> NewEstimate {
    let cost = CostBreakdown::new(120_000, 85_000, 15_000);
    NewEstimate::new("서울특별시 강남구 테헤란로 152", "부산광역시 해운대구 센텀중앙로 79", weight_kg, "일반화물", cost)
        .starting_at(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap())
}

pub fn recipient() -> RecipientDetails {
    RecipientDetails::new("최유나", "010-7777-8888")
        .with_email("yuna@example.com")
        .with_details("물류센터 B동 2층", "센텀 물류창고 3번 도크")
}

/// A fresh database with every pipeline API wired up over it.
#[derive(Debug)]
pub struct Pipeline {
    pub db: SqliteDatabase,
    pub who: Profiles,
    pub estimates: EstimateApi<SqliteDatabase>,
    pub matching: MatchingApi<SqliteDatabase>,
    pub orders: OrderApi<SqliteDatabase>,
    pub payments: PaymentApi<SqliteDatabase>,
    pub deliveries: DeliveryApi<SqliteDatabase>,
}

impl Pipeline {
    pub async fn new() -> Self {
        Self::with(DeliveryPolicy::default(), EventProducers::default()).await
    }

    pub async fn with_policy(policy: DeliveryPolicy) -> Self {
        Self::with(policy, EventProducers::default()).await
    }

    pub async fn with(policy: DeliveryPolicy, producers: EventProducers) -> Self {
        let db = prepare_test_env().await;
        let who = seed_profiles(&db).await;
        Self {
            estimates: EstimateApi::new(db.clone()),
            matching: MatchingApi::new(db.clone(), producers.clone()),
            orders: OrderApi::new(db.clone()),
            payments: PaymentApi::new(db.clone(), producers.clone()),
            deliveries: DeliveryApi::new(db.clone(), producers).with_policy(policy),
            db,
            who,
        }
    }

    /// A submitted estimate from Alice
    pub async fn submitted_estimate(&self) -> Estimate {
        self.estimates.create_estimate(self.who.alice(), general_cargo(5000)).await.expect("Error creating estimate")
    }

    /// Alice's estimate, accepted by carrier X
    pub async fn accepted(&self) -> (Estimate, Matching) {
        let estimate = self.submitted_estimate().await;
        let matching = self.matching.accept(estimate.id, self.who.x()).await.expect("Error accepting estimate");
        (estimate, matching)
    }

    pub async fn ordered(&self) -> (Matching, OrderSheet) {
        let (_, matching) = self.accepted().await;
        let order =
            self.orders.create_order(matching.id, recipient(), self.who.alice()).await.expect("Error creating order");
        (matching, order)
    }

    pub async fn paid(&self) -> (Matching, OrderSheet, AcceptedPayment) {
        let (matching, order) = self.ordered().await;
        let payment = self
            .payments
            .accept_payment(order.id, PaymentMethod::Card, self.who.alice())
            .await
            .expect("Error accepting payment");
        (matching, order, payment)
    }

    pub async fn finish(self) {
        drop(self.estimates);
        drop(self.matching);
        drop(self.orders);
        drop(self.payments);
        drop(self.deliveries);
        tear_down(self.db).await;
    }
}

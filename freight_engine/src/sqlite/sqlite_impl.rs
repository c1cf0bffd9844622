//! `SqliteDatabase` is the concrete SQLite implementation of a fulfillment pipeline backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module. Every multi-statement operation runs in one
//! transaction whose first statement is the guarding (conditional) write. SQLite takes the write lock on that
//! statement, so racing requests are serialised before any of them has read anything.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqliteConnection, SqlitePool};

use super::db::{deliveries, estimates, matchings, new_pool, order_sheets, payments, profiles, rejections};
use crate::{
    db_types::{
        Carrier,
        CarrierId,
        CostBreakdown,
        Delivery,
        DeliveryId,
        DeliveryStatus,
        Estimate,
        EstimateId,
        Matching,
        MatchingId,
        NewCarrier,
        NewEstimate,
        NewShipper,
        OrderSheet,
        OrderSheetId,
        Payment,
        PaymentId,
        PaymentMethod,
        PaymentStatus,
        RecipientDetails,
        RejectedMatching,
        Shipper,
        ShipperId,
    },
    helpers::{generate_order_code, MAX_ORDER_CODE_ATTEMPTS},
    traits::{
        is_foreign_key_violation,
        is_unique_violation,
        CarrierDeliveryRow,
        DeliveryBucket,
        DeliveryManagement,
        EstimateManagement,
        FulfillmentDatabase,
        FulfillmentError,
        InsertPaymentResult,
        MatchingManagement,
        OrderManagement,
        Pagination,
        PaymentManagement,
        ProfileManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), FulfillmentError> {
        self.pool.close().await;
        Ok(())
    }
}

impl EstimateManagement for SqliteDatabase {
    async fn insert_estimate(&self, shipper: ShipperId, estimate: NewEstimate) -> Result<Estimate, FulfillmentError> {
        let total = estimate.cost.total().ok_or_else(|| cost_overflow(&estimate.cost))?;
        let mut tx = self.pool.begin().await?;
        let estimate = estimates::insert_estimate(shipper, estimate, total, &mut tx).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                FulfillmentError::ShipperNotFound(shipper)
            } else {
                e.into()
            }
        })?;
        if !estimate.is_temp {
            matchings::open_candidacy(estimate.id, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ {} saved for {shipper} (draft: {})", estimate.id, estimate.is_temp);
        Ok(estimate)
    }

    async fn fetch_estimate(&self, id: EstimateId) -> Result<Option<Estimate>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let estimate = estimates::fetch_estimate(id, &mut conn).await?;
        Ok(estimate)
    }

    async fn fetch_estimates_for_shipper(
        &self,
        shipper: ShipperId,
        page: Pagination,
    ) -> Result<Vec<Estimate>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let estimates = estimates::fetch_estimates_for_shipper(shipper, page, &mut conn).await?;
        Ok(estimates)
    }

    async fn submit_estimate(&self, id: EstimateId) -> Result<Estimate, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let estimate = match estimates::submit_draft(id, &mut tx).await? {
            Some(estimate) => estimate,
            None => {
                return match estimates::fetch_estimate(id, &mut tx).await? {
                    None => Err(FulfillmentError::EstimateNotFound(id)),
                    Some(_) => Err(FulfillmentError::EstimateAlreadySubmitted(id)),
                };
            },
        };
        matchings::open_candidacy(id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {id} has been submitted and is now visible to carriers");
        Ok(estimate)
    }

    async fn delete_draft(&self, id: EstimateId) -> Result<(), FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        if estimates::delete_draft(id, &mut conn).await? {
            debug!("🗃️ Draft {id} deleted");
            return Ok(());
        }
        match estimates::fetch_estimate(id, &mut conn).await? {
            None => Err(FulfillmentError::EstimateNotFound(id)),
            Some(_) => Err(FulfillmentError::EstimateAlreadySubmitted(id)),
        }
    }
}

impl MatchingManagement for SqliteDatabase {
    async fn fetch_candidates(&self, carrier: CarrierId, page: Pagination) -> Result<Vec<Estimate>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let candidates = matchings::fetch_candidates(carrier, page, &mut conn).await?;
        trace!("🗃️ {} candidates for {carrier}", candidates.len());
        Ok(candidates)
    }

    async fn accept_estimate(&self, estimate: EstimateId, carrier: CarrierId) -> Result<Matching, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        if estimates::mark_matched(estimate, &mut tx).await?.is_none() {
            let err = classify_unmatchable(estimate, &mut tx).await?;
            debug!("🗃️ {carrier} cannot accept {estimate}: {err}");
            return Err(err);
        }
        let now = Utc::now();
        let claimed =
            matchings::claim_candidacy(estimate, carrier, now, &mut tx).await.map_err(|e| unknown_carrier(e, carrier))?;
        let matching = match claimed {
            Some(m) => m,
            None => {
                trace!("🗃️ {estimate} has no open candidacy. Creating an accepted matching for {carrier}");
                matchings::insert_accepted(estimate, carrier, now, &mut tx).await.map_err(|e| {
                    if is_unique_violation(&e) {
                        FulfillmentError::EstimateAlreadyMatched(estimate)
                    } else {
                        unknown_carrier(e, carrier)
                    }
                })?
            },
        };
        tx.commit().await?;
        debug!("🗃️ {estimate} matched with {carrier} via {}", matching.id);
        Ok(matching)
    }

    async fn reject_estimate(
        &self,
        estimate: EstimateId,
        carrier: CarrierId,
    ) -> Result<RejectedMatching, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let rejection = rejections::insert_rejection(carrier, estimate, &mut conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                FulfillmentError::DuplicateRejection { carrier, estimate }
            } else {
                unknown_carrier(e, carrier)
            }
        })?;
        match rejection {
            Some(r) => {
                debug!("🗃️ {carrier} rejected {estimate}");
                Ok(r)
            },
            None => match estimates::fetch_estimate(estimate, &mut conn).await? {
                None => Err(FulfillmentError::EstimateNotFound(estimate)),
                Some(e) if e.is_temp => Err(FulfillmentError::EstimateIsDraft(estimate)),
                Some(_) => Err(FulfillmentError::EstimateNoLongerOpen(estimate)),
            },
        }
    }

    async fn fetch_matching(&self, id: MatchingId) -> Result<Option<Matching>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let matching = matchings::fetch_matching(id, &mut conn).await?;
        Ok(matching)
    }

    async fn fetch_matchings_for_estimate(&self, estimate: EstimateId) -> Result<Vec<Matching>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let result = matchings::fetch_matchings_for_estimate(estimate, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_accepted_matching(&self, estimate: EstimateId) -> Result<Option<Matching>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let result = matchings::fetch_accepted_matching(estimate, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_rejections_for_carrier(&self, carrier: CarrierId) -> Result<Vec<RejectedMatching>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let result = rejections::fetch_rejections_for_carrier(carrier, &mut conn).await?;
        Ok(result)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order_sheet(
        &self,
        matching: MatchingId,
        recipient: RecipientDetails,
    ) -> Result<OrderSheet, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        if estimates::mark_ordered_for_matching(matching, &mut tx).await?.is_none() {
            let err = match matchings::fetch_matching(matching, &mut tx).await? {
                None => FulfillmentError::MatchingNotFound(matching),
                Some(m) if !m.is_accepted => FulfillmentError::MatchingNotAccepted(matching),
                Some(_) => FulfillmentError::OrderAlreadyExists(matching),
            };
            debug!("🗃️ Cannot create an order for {matching}: {err}");
            return Err(err);
        }
        // The guard above guarantees no order exists for this matching, so a unique violation here can only be an
        // order code collision.
        let mut attempts = 0;
        let order = loop {
            attempts += 1;
            let code = generate_order_code(Utc::now(), &mut rand::thread_rng());
            match order_sheets::insert_order_sheet(matching, &code, &recipient, &mut tx).await {
                Ok(order) => break order,
                Err(e) if is_unique_violation(&e) && attempts < MAX_ORDER_CODE_ATTEMPTS => {
                    warn!("🗃️ Order code {code} is already taken. Generating another one.");
                },
                Err(e) if is_unique_violation(&e) => {
                    error!("🗃️ Could not find a free order code for {matching} after {attempts} attempts");
                    return Err(FulfillmentError::OrderCodeExhausted(attempts));
                },
                Err(e) => return Err(e.into()),
            }
        };
        tx.commit().await?;
        debug!("🗃️ Order {} ({}) created for {matching}", order.order_code, order.id);
        Ok(order)
    }

    async fn fetch_order_sheet(&self, id: OrderSheetId) -> Result<Option<OrderSheet>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = order_sheets::fetch_order_sheet(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_sheet_for_matching(
        &self,
        matching: MatchingId,
    ) -> Result<Option<OrderSheet>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = order_sheets::fetch_order_sheet_for_matching(matching, &mut conn).await?;
        Ok(order)
    }
}

impl PaymentManagement for SqliteDatabase {
    async fn insert_payment(
        &self,
        order_sheet: OrderSheetId,
        method: PaymentMethod,
        status: PaymentStatus,
        open_delivery: bool,
    ) -> Result<InsertPaymentResult, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let payment = payments::insert_payment(order_sheet, method, status, Utc::now(), &mut tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    FulfillmentError::PaymentAlreadyExists(order_sheet)
                } else {
                    e.into()
                }
            })?
            .ok_or(FulfillmentError::OrderSheetNotFound(order_sheet))?;
        debug!("🗃️ {} recorded for {order_sheet} ({method}, {status})", payment.id);
        let delivery = if open_delivery {
            let delivery = open_delivery_for_payment(payment.id, &mut tx).await?;
            debug!("🗃️ {} opened for {}", delivery.id, payment.id);
            Some(delivery)
        } else {
            None
        };
        tx.commit().await?;
        Ok(InsertPaymentResult { payment, delivery })
    }

    async fn fetch_payment(&self, id: PaymentId) -> Result<Option<Payment>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment(id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payment_for_order_sheet(
        &self,
        order_sheet: OrderSheetId,
    ) -> Result<Option<Payment>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_order_sheet(order_sheet, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payment_for_matching(&self, matching: MatchingId) -> Result<Option<Payment>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_matching(matching, &mut conn).await?;
        Ok(payment)
    }
}

impl DeliveryManagement for SqliteDatabase {
    async fn insert_delivery(&self, payment: PaymentId) -> Result<Delivery, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = open_delivery_for_payment(payment, &mut conn).await?;
        debug!("🗃️ {} opened for {payment}", delivery.id);
        Ok(delivery)
    }

    async fn fetch_delivery(&self, id: DeliveryId) -> Result<Option<Delivery>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::fetch_delivery(id, &mut conn).await?;
        Ok(delivery)
    }

    async fn fetch_delivery_for_payment(&self, payment: PaymentId) -> Result<Option<Delivery>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::fetch_delivery_for_payment(payment, &mut conn).await?;
        Ok(delivery)
    }

    async fn fetch_delivery_for_matching(&self, matching: MatchingId) -> Result<Option<Delivery>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::fetch_delivery_for_matching(matching, &mut conn).await?;
        Ok(delivery)
    }

    async fn update_delivery_status(
        &self,
        id: DeliveryId,
        expected: DeliveryStatus,
        new_status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Delivery>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::update_status(id, expected, new_status, completed_at, &mut conn).await?;
        Ok(delivery)
    }

    async fn fetch_carrier_deliveries(
        &self,
        carrier: CarrierId,
        bucket: DeliveryBucket,
        page: Pagination,
    ) -> Result<Vec<CarrierDeliveryRow>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let rows = deliveries::fetch_carrier_deliveries(carrier, bucket, page, &mut conn).await?;
        Ok(rows)
    }
}

impl ProfileManagement for SqliteDatabase {
    async fn fetch_shipper(&self, id: ShipperId) -> Result<Option<Shipper>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let shipper = profiles::fetch_shipper(id, &mut conn).await?;
        Ok(shipper)
    }

    async fn fetch_carrier(&self, id: CarrierId) -> Result<Option<Carrier>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let carrier = profiles::fetch_carrier(id, &mut conn).await?;
        Ok(carrier)
    }

    async fn insert_shipper(&self, shipper: NewShipper) -> Result<Shipper, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let shipper = profiles::insert_shipper(shipper, &mut conn).await?;
        debug!("🗃️ Shipper profile {} created", shipper.id);
        Ok(shipper)
    }

    async fn insert_carrier(&self, carrier: NewCarrier) -> Result<Carrier, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let carrier = profiles::insert_carrier(carrier, &mut conn).await?;
        debug!("🗃️ Carrier profile {} created", carrier.id);
        Ok(carrier)
    }
}

fn unknown_carrier(e: sqlx::Error, carrier: CarrierId) -> FulfillmentError {
    if is_foreign_key_violation(&e) {
        debug!("🗃️ {carrier} has no carrier profile");
        FulfillmentError::CarrierNotFound(carrier)
    } else {
        e.into()
    }
}

fn cost_overflow(cost: &CostBreakdown) -> FulfillmentError {
    FulfillmentError::InvalidInput(format!(
        "The cost breakdown ({}, {}, {}) is too large to total",
        cost.base_cost, cost.distance_cost, cost.special_option_cost
    ))
}

/// Works out why the accept guard on `estimate` did not hold.
async fn classify_unmatchable(
    estimate: EstimateId,
    conn: &mut SqliteConnection,
) -> Result<FulfillmentError, FulfillmentError> {
    let err = match estimates::fetch_estimate(estimate, conn).await? {
        None => FulfillmentError::EstimateNotFound(estimate),
        Some(e) if e.is_temp => FulfillmentError::EstimateIsDraft(estimate),
        Some(_) => FulfillmentError::EstimateAlreadyMatched(estimate),
    };
    Ok(err)
}

async fn open_delivery_for_payment(
    payment: PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Delivery, FulfillmentError> {
    deliveries::insert_delivery(payment, conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                FulfillmentError::DeliveryAlreadyExists(payment)
            } else {
                e.into()
            }
        })?
        .ok_or(FulfillmentError::PaymentNotFound(payment))
}

impl SqliteDatabase {
    /// Creates a new database API object. The database file is created if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

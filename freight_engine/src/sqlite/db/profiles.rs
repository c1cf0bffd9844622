use sqlx::SqliteConnection;

use crate::db_types::{Carrier, CarrierId, NewCarrier, NewShipper, Shipper, ShipperId};

pub async fn insert_shipper(shipper: NewShipper, conn: &mut SqliteConnection) -> Result<Shipper, sqlx::Error> {
    sqlx::query_as("INSERT INTO shippers (name, phone, email, address) VALUES ($1, $2, $3, $4) RETURNING *")
        .bind(shipper.name)
        .bind(shipper.phone)
        .bind(shipper.email)
        .bind(shipper.address)
        .fetch_one(conn)
        .await
}

pub async fn insert_carrier(carrier: NewCarrier, conn: &mut SqliteConnection) -> Result<Carrier, sqlx::Error> {
    sqlx::query_as("INSERT INTO carriers (name, phone, email, vehicle_number) VALUES ($1, $2, $3, $4) RETURNING *")
        .bind(carrier.name)
        .bind(carrier.phone)
        .bind(carrier.email)
        .bind(carrier.vehicle_number)
        .fetch_one(conn)
        .await
}

pub async fn fetch_shipper(id: ShipperId, conn: &mut SqliteConnection) -> Result<Option<Shipper>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shippers WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_carrier(id: CarrierId, conn: &mut SqliteConnection) -> Result<Option<Carrier>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM carriers WHERE id = $1").bind(id).fetch_optional(conn).await
}

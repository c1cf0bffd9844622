use crate::{
    db_types::{Carrier, CarrierId, NewCarrier, NewShipper, Shipper, ShipperId},
    traits::FulfillmentError,
};

/// The shipper and carrier profile store. The pipeline only reads display fields from it.
#[allow(async_fn_in_trait)]
pub trait ProfileManagement {
    async fn fetch_shipper(&self, id: ShipperId) -> Result<Option<Shipper>, FulfillmentError>;

    async fn fetch_carrier(&self, id: CarrierId) -> Result<Option<Carrier>, FulfillmentError>;

    async fn insert_shipper(&self, shipper: NewShipper) -> Result<Shipper, FulfillmentError>;

    async fn insert_carrier(&self, carrier: NewCarrier) -> Result<Carrier, FulfillmentError>;
}

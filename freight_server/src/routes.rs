//! Request handler definitions
//!
//! Define each route and its handler here. Handlers only resolve the request into pipeline API calls. Every rule
//! about who may do what, and in which state, lives in `freight_engine`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here is async and only awaits database futures.
//!
//! Routes that need a role are declared with `requires [...]`. The ACL middleware resolves the actor from the identity
//! headers before the handler runs and refuses actors with any other role.
use actix_web::{get, web, HttpResponse, Responder};
use freight_engine::{
    db_types::{DeliveryId, EstimateId, MatchingId, NewEstimate, OrderSheetId, PaymentId, RecipientDetails, Role},
    traits::DeliveryBucket,
    DeliveryApi,
    DeliveryManagement,
    EstimateApi,
    EstimateManagement,
    MatchingApi,
    MatchingManagement,
    OrderApi,
    OrderManagement,
    Pagination,
    PaymentApi,
    PaymentManagement,
    ProfileManagement,
};
use log::*;

use crate::{
    auth::AuthenticatedActor,
    config::PagingConfig,
    data_objects::{JsonResponse, MatchedStatus, PaymentRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

fn page(query: web::Query<Pagination>, paging: &PagingConfig) -> Pagination {
    query.into_inner().with_default_count(paging.default_count)
}

//----------------------------------------------   Estimates  ----------------------------------------------------
route!(create_estimate => Post "/estimates" impl EstimateManagement where requires [Role::Shipper]);
/// Stores a new estimate for the acting shipper. Send `"is_temp": true` to keep it as a draft that carriers cannot
/// see yet.
pub async fn create_estimate<B: EstimateManagement>(
    actor: AuthenticatedActor,
    body: web::Json<NewEstimate>,
    api: web::Data<EstimateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new estimate from {}", actor.0);
    let estimate = api.create_estimate(actor.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(estimate))
}

route!(my_estimates => Get "/estimates" impl EstimateManagement where requires [Role::Shipper]);
pub async fn my_estimates<B: EstimateManagement>(
    actor: AuthenticatedActor,
    query: web::Query<Pagination>,
    paging: web::Data<PagingConfig>,
    api: web::Data<EstimateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = page(query, &paging);
    debug!("💻️ GET estimates for {} ({page:?})", actor.0);
    let estimates = api.estimates_for_shipper(actor.0, page).await?;
    Ok(HttpResponse::Ok().json(estimates))
}

route!(estimate => Get "/estimates/{id}" impl EstimateManagement where requires [Role::Shipper, Role::Carrier]);
pub async fn estimate<B: EstimateManagement>(
    path: web::Path<EstimateId>,
    api: web::Data<EstimateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET {id}");
    let estimate = api.fetch_estimate(id).await?;
    Ok(HttpResponse::Ok().json(estimate))
}

route!(submit_estimate => Post "/estimates/{id}/submit" impl EstimateManagement where requires [Role::Shipper]);
pub async fn submit_estimate<B: EstimateManagement>(
    actor: AuthenticatedActor,
    path: web::Path<EstimateId>,
    api: web::Data<EstimateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST submit {id} for {}", actor.0);
    let estimate = api.submit_estimate(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(estimate))
}

route!(delete_draft => Delete "/estimates/{id}" impl EstimateManagement where requires [Role::Shipper]);
/// Drafts can be deleted. Submitted estimates are kept as history and cannot.
pub async fn delete_draft<B: EstimateManagement>(
    actor: AuthenticatedActor,
    path: web::Path<EstimateId>,
    api: web::Data<EstimateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE {id} for {}", actor.0);
    api.delete_draft(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{id} deleted"))))
}

//----------------------------------------------   Matching  ----------------------------------------------------
route!(estimate_matched => Get "/estimates/{id}/matched" impl EstimateManagement, MatchingManagement where requires [Role::Shipper, Role::Carrier]);
pub async fn estimate_matched<B: EstimateManagement + MatchingManagement>(
    path: web::Path<EstimateId>,
    api: web::Data<MatchingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let estimate_id = path.into_inner();
    trace!("💻️ GET matched status of {estimate_id}");
    let matched = api.is_estimate_matched(estimate_id).await?;
    Ok(HttpResponse::Ok().json(MatchedStatus { estimate_id, matched }))
}

route!(candidates => Get "/candidates" impl EstimateManagement, MatchingManagement where requires [Role::Carrier]);
/// The estimates the acting carrier can still accept or reject, newest first. Estimates the carrier has rejected are
/// never listed again.
pub async fn candidates<B: EstimateManagement + MatchingManagement>(
    actor: AuthenticatedActor,
    query: web::Query<Pagination>,
    paging: web::Data<PagingConfig>,
    api: web::Data<MatchingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = page(query, &paging);
    debug!("💻️ GET candidates for {} ({page:?})", actor.0);
    let candidates = api.list_candidates(actor.0, page).await?;
    Ok(HttpResponse::Ok().json(candidates))
}

route!(accept_estimate => Post "/estimates/{id}/accept" impl EstimateManagement, MatchingManagement where requires [Role::Carrier]);
/// Exactly one carrier wins an estimate. Everyone else gets a 409.
pub async fn accept_estimate<B: EstimateManagement + MatchingManagement>(
    actor: AuthenticatedActor,
    path: web::Path<EstimateId>,
    api: web::Data<MatchingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST accept {id} by {}", actor.0);
    let matching = api.accept(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(matching))
}

route!(reject_estimate => Post "/estimates/{id}/reject" impl EstimateManagement, MatchingManagement where requires [Role::Carrier]);
pub async fn reject_estimate<B: EstimateManagement + MatchingManagement>(
    actor: AuthenticatedActor,
    path: web::Path<EstimateId>,
    api: web::Data<MatchingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST reject {id} by {}", actor.0);
    let rejection = api.reject(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(rejection))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_form => Get "/matchings/{id}/order_form" impl EstimateManagement, MatchingManagement, OrderManagement, ProfileManagement where requires [Role::Shipper, Role::Carrier]);
pub async fn order_form<B>(
    actor: AuthenticatedActor,
    path: web::Path<MatchingId>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: EstimateManagement + MatchingManagement + OrderManagement + ProfileManagement,
{
    let id = path.into_inner();
    debug!("💻️ GET order form for {id} by {}", actor.0);
    let form = api.load_order_form(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(form))
}

route!(create_order => Post "/matchings/{id}/order" impl EstimateManagement, MatchingManagement, OrderManagement, ProfileManagement where requires [Role::Shipper]);
/// Confirms the order for an accepted matching. A matching is only ever ordered once.
pub async fn create_order<B>(
    actor: AuthenticatedActor,
    path: web::Path<MatchingId>,
    body: web::Json<RecipientDetails>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: EstimateManagement + MatchingManagement + OrderManagement + ProfileManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST order for {id} by {}", actor.0);
    let order = api.create_order(id, body.into_inner(), actor.0).await?;
    Ok(HttpResponse::Created().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(accept_payment => Post "/orders/{id}/payment" impl EstimateManagement, MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement, ProfileManagement where requires [Role::Shipper]);
/// Records payment for an order sheet. The response carries the payment and the delivery opened with it.
pub async fn accept_payment<B>(
    actor: AuthenticatedActor,
    path: web::Path<OrderSheetId>,
    body: web::Json<PaymentRequest>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: EstimateManagement
        + MatchingManagement
        + OrderManagement
        + PaymentManagement
        + DeliveryManagement
        + ProfileManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST payment for {id} by {} via {}", actor.0, body.method);
    let accepted = api.accept_payment(id, body.method, actor.0).await?;
    Ok(HttpResponse::Created().json(accepted))
}

route!(payment_summary => Get "/payments/{id}/summary" impl EstimateManagement, MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement, ProfileManagement where requires [Role::Shipper, Role::Carrier]);
pub async fn payment_summary<B>(
    actor: AuthenticatedActor,
    path: web::Path<PaymentId>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: EstimateManagement
        + MatchingManagement
        + OrderManagement
        + PaymentManagement
        + DeliveryManagement
        + ProfileManagement,
{
    let id = path.into_inner();
    debug!("💻️ GET summary of {id} for {}", actor.0);
    let summary = api.complete(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Deliveries  ----------------------------------------------------
route!(create_delivery => Post "/payments/{id}/delivery" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
pub async fn create_delivery<B>(
    actor: AuthenticatedActor,
    path: web::Path<PaymentId>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST delivery for {id} by {}", actor.0);
    let delivery = api.create_delivery(id, actor.0).await?;
    Ok(HttpResponse::Created().json(delivery))
}

route!(mark_in_transit => Post "/deliveries/{id}/in_transit" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
pub async fn mark_in_transit<B>(
    actor: AuthenticatedActor,
    path: web::Path<DeliveryId>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST {id} in transit by {}", actor.0);
    let delivery = api.mark_in_transit(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(mark_completed => Post "/deliveries/{id}/complete" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
pub async fn mark_completed<B>(
    actor: AuthenticatedActor,
    path: web::Path<DeliveryId>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST {id} complete by {}", actor.0);
    let delivery = api.mark_completed(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(matching_in_transit => Post "/matchings/{id}/delivery/in_transit" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
/// Same as `/deliveries/{id}/in_transit`, for clients that only know the matching.
pub async fn matching_in_transit<B>(
    actor: AuthenticatedActor,
    path: web::Path<MatchingId>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST delivery of {id} in transit by {}", actor.0);
    let delivery = api.mark_in_transit_for_matching(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(matching_completed => Post "/matchings/{id}/delivery/complete" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
pub async fn matching_completed<B>(
    actor: AuthenticatedActor,
    path: web::Path<MatchingId>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let id = path.into_inner();
    debug!("💻️ POST delivery of {id} complete by {}", actor.0);
    let delivery = api.mark_completed_for_matching(id, actor.0).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(carrier_deliveries => Get "/deliveries/{bucket}" impl MatchingManagement, OrderManagement, PaymentManagement, DeliveryManagement where requires [Role::Carrier]);
/// The acting carrier's jobs in one of the reporting buckets: `unpaid`, `in_progress` or `completed`.
pub async fn carrier_deliveries<B>(
    actor: AuthenticatedActor,
    path: web::Path<String>,
    query: web::Query<Pagination>,
    paging: web::Data<PagingConfig>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MatchingManagement + OrderManagement + PaymentManagement + DeliveryManagement,
{
    let bucket = path.into_inner();
    let bucket = bucket.parse::<DeliveryBucket>().map_err(|e| {
        debug!("💻️ {bucket} is not a delivery bucket. {e}");
        ServerError::InvalidRequestPath(e.to_string())
    })?;
    let page = page(query, &paging);
    debug!("💻️ GET {bucket} deliveries for {} ({page:?})", actor.0);
    let rows = api.deliveries(actor.0, bucket, page).await?;
    Ok(HttpResponse::Ok().json(rows))
}

//! Access control middleware for the freight server.
//! This middleware can be placed on any route or service.
//!
//! It resolves the acting shipper or carrier from the identity headers and checks the actor's role against the roles
//! the route accepts. If the actor has one of them, the actor is stored in the request extensions and the request
//! continues. Missing or malformed identity headers give a 401. A role the route does not accept gives a 403.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use freight_engine::db_types::Role;
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::actor_from_headers,
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    allowed_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(allowed_roles: &[Role]) -> Self {
        AclMiddlewareFactory { allowed_roles: allowed_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { allowed_roles: self.allowed_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    allowed_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let allowed_roles = self.allowed_roles.clone();
        Box::pin(async move {
            let actor = actor_from_headers(req.headers()).map_err(|e| {
                debug!("💻️ Request to {} has no usable identity. {e}", req.path());
                ServerError::from(e)
            })?;
            if !allowed_roles.contains(&actor.role()) {
                let allowed = allowed_roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
                warn!("💻️ {actor} may not call {}. Allowed roles: {allowed}", req.path());
                let msg = format!("This route is only open to: {allowed}");
                return Err(ServerError::from(AuthError::InsufficientPermissions(msg)).into());
            }
            req.extensions_mut().insert(actor);
            service.call(req).await
        })
    }
}

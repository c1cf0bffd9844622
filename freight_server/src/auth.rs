//! Actor identity
//!
//! Authentication happens upstream. The identity gateway in front of this server sets the `fps_actor_role` and
//! `fps_actor_id` headers, and this module turns them into the [`Actor`] that every pipeline call takes.
use std::str::FromStr;

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpMessage, HttpRequest};
use freight_engine::db_types::{Actor, CarrierId, Role, ShipperId};
use futures::future::{ready, Ready};
use log::*;

use crate::errors::{AuthError, ServerError};

pub const ACTOR_ROLE_HEADER: &str = "fps_actor_role";
pub const ACTOR_ID_HEADER: &str = "fps_actor_id";

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AuthError> {
    let role = header_value(headers, ACTOR_ROLE_HEADER)?;
    let role = Role::from_str(role).map_err(|_| AuthError::InvalidRole(role.to_string()))?;
    let id = header_value(headers, ACTOR_ID_HEADER)?;
    let id = match id.trim().parse::<i64>() {
        Ok(v) if v > 0 => v,
        _ => return Err(AuthError::InvalidActorId(id.to_string())),
    };
    let actor = match role {
        Role::Shipper => Actor::Shipper(ShipperId(id)),
        Role::Carrier => Actor::Carrier(CarrierId(id)),
    };
    Ok(actor)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, AuthError> {
    let value = headers.get(name).ok_or(AuthError::MissingHeader(name))?;
    value.to_str().map_err(|e| {
        debug!("💻️ Could not read the {name} header. {e}");
        AuthError::MissingHeader(name)
    })
}

/// The actor making the request.
///
/// Routes wrapped in the ACL middleware find the actor it already resolved in the request extensions. Everywhere else
/// it is read from the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor(pub Actor);

impl AuthenticatedActor {
    pub fn actor(&self) -> Actor {
        self.0
    }
}

impl FromRequest for AuthenticatedActor {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = req.extensions().get::<Actor>().copied();
        let actor = match resolved {
            Some(actor) => Ok(actor),
            None => actor_from_headers(req.headers()),
        };
        ready(actor.map(Self).map_err(ServerError::from))
    }
}

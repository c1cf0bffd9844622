//! # Freight fulfillment server
//! This crate hosts the HTTP surface of the freight fulfillment pipeline. It is responsible for:
//! * Resolving the acting shipper or carrier from the identity headers set by the upstream gateway.
//! * Enforcing the role required by each route.
//! * Translating requests into pipeline API calls and pipeline errors into HTTP status codes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The pipeline routes. See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

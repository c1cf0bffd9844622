//! Server configuration
//!
//! Every setting is read from an `FPS_*` environment variable. Invalid values are logged and replaced with the
//! default, so the server always starts with a usable configuration.
use std::{env, fmt::Display, str::FromStr};

use freight_common::helpers::parse_boolean_flag;
use freight_engine::{sqlite_db::db_url, traits::DEFAULT_PAGE_SIZE, DeliveryPolicy};
use log::*;

const DEFAULT_FPS_HOST: &str = "127.0.0.1";
const DEFAULT_FPS_PORT: u16 = 8470;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Listing defaults shared by every paged route
    pub paging: PagingConfig,
    pub delivery_policy: DeliveryPolicy,
    /// Capacity of the queue in front of each event hook
    pub event_buffer_size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingConfig {
    /// Used when a request does not say how many items it wants
    pub default_count: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { default_count: DEFAULT_PAGE_SIZE }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FPS_HOST.to_string(),
            port: DEFAULT_FPS_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            paging: PagingConfig::default(),
            delivery_policy: DeliveryPolicy::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FPS_HOST").ok().unwrap_or_else(|| DEFAULT_FPS_HOST.into());
        let port = parse_env("FPS_PORT", DEFAULT_FPS_PORT);
        let database_url = db_url();
        let max_connections = parse_env("FPS_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).max(1);
        let default_count = parse_env("FPS_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let default_count = if default_count < 1 {
            warn!("🪛️ FPS_PAGE_SIZE must be positive. Using the default, {DEFAULT_PAGE_SIZE}, instead.");
            DEFAULT_PAGE_SIZE
        } else {
            default_count
        };
        let allow_complete_from_pending =
            parse_boolean_flag(env::var("FPS_ALLOW_COMPLETE_FROM_PENDING").ok(), false);
        let create_missing_delivery = parse_boolean_flag(env::var("FPS_CREATE_MISSING_DELIVERY").ok(), false);
        if allow_complete_from_pending {
            info!("🪛️ Carriers may complete deliveries that never went in transit.");
        }
        if create_missing_delivery {
            info!("🪛️ Missing deliveries on paid orders will be opened on demand.");
        }
        let event_buffer_size = parse_env("FPS_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE).max(1);
        Self {
            host,
            port,
            database_url,
            max_connections,
            paging: PagingConfig { default_count },
            delivery_policy: DeliveryPolicy { allow_complete_from_pending, create_missing_delivery },
            event_buffer_size,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

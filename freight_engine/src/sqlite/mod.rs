//! SQLite backend for the fulfillment pipeline.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

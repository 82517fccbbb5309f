//! Wrapped Server Library
//!
//! Yearly listening recaps built from a music catalog account: aggregation,
//! slides, Duo Wrapped and shareable cards, behind an HTTP API.

pub mod catalog_client;
pub mod config;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod wrapped;

pub use server::{run_server, RequestsLoggingLevel};
pub use store::{FullStore, SqliteWrapStore};

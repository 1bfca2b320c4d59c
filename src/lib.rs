//! Product catalog kept in sync between a remote REST resource and a local
//! durable mirror.
//!
//! [`app::Catalog`] is the session container: it seeds the canonical list
//! from the mirror, runs remote commands concurrently, and applies their
//! resolutions to the [`store::CatalogStore`] one at a time.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod render;
pub mod store;

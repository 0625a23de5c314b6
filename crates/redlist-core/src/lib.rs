//! Core types and the filter/aggregation engine for the Red List explorer.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Harvesting, persistence and the JSON API all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod category;
pub mod error;
pub mod filter;
pub mod index;
pub mod reconcile;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod trajectory;

pub use error::{Error, Result};
pub use snapshot::Snapshot;

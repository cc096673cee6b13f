//! HTTP distribution store for edgeplane.
//!
//! Implements `DistributionStore` against a remote configuration API using
//! `ETag` / `If-Match` for optimistic concurrency. Requests are not retried.

mod client;

pub use client::{AuthHeader, HttpStore, UNREPORTED_VERSION};

//! NEAR Explorer indexer library.
//!
//! Continuously ingests blocks (with their chunks and embedded
//! transactions) from a nearcore JSON-RPC node into a relational store.
//! Three sync passes share one bounded fetch-and-persist pipeline:
//!
//! - **new-tip** catches up from the last stored height to the chain tip
//! - **old-history** backfills from the oldest stored height to genesis
//! - **gap** bisects the stored range and refetches missing heights

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;

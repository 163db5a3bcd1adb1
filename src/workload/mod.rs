//! Route workload derivation.
//!
//! This module expands routes into per-ZIP records, classifies routes into
//! zones, sums workload per ZIP and per zone, selects the routes in view, and
//! rebalances overloaded routes across the ZIP codes they serve.

pub mod aggregate;
pub mod explode;
pub mod filter;
pub mod rebalance;
pub mod summary;
pub mod types;
pub mod utility;
pub mod zone;

//! Persistence and aggregation layer for the E-Bill Tracker.
//!
//! Owns the append-only reading log and the appliance list on disk, derives
//! consumption deltas and cost estimates from the log, and groups them into
//! daily / weekly / monthly / yearly / custom buckets for display.

pub mod aggregator;
pub mod analysis;
pub mod appliance_store;
pub mod store;

pub use tracker_core as core;

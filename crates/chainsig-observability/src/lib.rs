//! # chainsig-observability
//!
//! Logging and metrics for ChainSig.
//!
//! ## Metrics
//! - `chainsig.resolve.outcomes`: counter, tagged with kind + outcome
//! - `chainsig.resolve.candidates`: histogram of bucket sizes tried per resolve
//! - `chainsig.resolve.batch_size`: histogram of batch resolve sizes
//! - `chainsig.registry.records`: counter of records published
//!
//! ## Logging
//! Plain or JSON `tracing-subscriber` output, with levels set per component.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::ResolveMetrics;
pub use tracing_setup::{init_tracing, LogConfig};

//! Caching layer for playdeck-core
//!
//! Memoized play maps over the play log, rebuilt on demand.

pub mod aggregation;

pub use aggregation::{AggregationCache, Snapshot};

//! playdeck-core - Core library for playdeck
//!
//! Play-log store, aggregation cache, filter engine, and the library
//! operations (rename, archive, clear history) that keep them consistent.

pub mod aggregate;
pub mod cache;
pub mod cheats;
pub mod collections;
pub mod config;
pub mod error;
pub mod filters;
pub mod library;
pub mod models;
pub mod names;
pub mod store;

pub use cache::{AggregationCache, Snapshot};
pub use cheats::{CheatAvailability, CheatIndex, IndexState};
pub use collections::{Collection, CollectionIndex};
pub use config::Settings;
pub use error::{CoreError, DegradedState};
pub use filters::{FilterClock, FilterCriterion, FilterEngine, FilterStack, Predicate};
pub use library::{Library, RomLocator};
pub use store::{PlayLogStore, SqlitePlayLog};

//! Play-log filtering
//!
//! - [`Predicate`]: structured selection over sessions, rendered to SQL or evaluated in memory
//! - [`FilterCriterion`] / [`FilterStack`]: user-chosen, AND-combined criteria
//! - [`FilterEngine`]: ranked candidate criteria for the current scope

pub mod engine;
pub mod predicate;
pub mod stack;

pub use engine::{FilterClock, FilterEngine};
pub use predicate::Predicate;
pub use stack::{FilterCriterion, FilterStack, MAX_TIER};

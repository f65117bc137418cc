//! Pipeline entry points.
//!
//! - `diff`: week-over-week comparison of parsed lists
//! - `circuit_breaker`: write guard against truncated upstream files
//! - `update`: fetch, parse, compare and store a region's week

pub mod circuit_breaker;
pub mod diff;
pub mod update;

pub use circuit_breaker::{CategoryShrink, CircuitBreaker, CircuitBreakerResult};
pub use diff::{
    DiffSummary, MatchRule, NoWeeksOnList, WeeksOnListLookup, books_match, compare_lists,
    compare_with_weeks,
};
pub use update::{UpdateOutcome, run_update, run_update_all};

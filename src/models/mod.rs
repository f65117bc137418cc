// src/models/mod.rs

//! Domain models for the bestseller tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod book;
mod config;
mod region;

// Re-export all public types
pub use book::{
    BestsellerList, Book, Category, DEFAULT_LIST_TITLE, UNKNOWN_AUTHOR, UNKNOWN_PUBLISHER,
};
pub use config::{
    CircuitBreakerSettings, ComparisonConfig, Config, FetcherConfig, StorageConfig,
};
pub use region::Region;

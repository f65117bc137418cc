// src/error.rs

//! Unified error handling for the bestseller tracker.
//!
//! The parser and comparator never fail on malformed list text; these errors
//! come from the layers around them (fetching, storage, configuration).

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Raw list could not be fetched from any endpoint
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Stored list is unreadable or inconsistent
    #[error("Storage error: {0}")]
    Storage(String),

    /// Weeks-on-list lookup failed
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Write refused because the new list shrank suspiciously
    #[error("Circuit breaker triggered: {0}")]
    CircuitBreaker(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a lookup error.
    pub fn lookup(message: impl fmt::Display) -> Self {
        Self::Lookup(message.to_string())
    }
}

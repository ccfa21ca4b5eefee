//! # Error Types
//!
//! This module defines error types used throughout the tivu library.
//!
//! The PCL decoder itself never fails: malformed input is dropped, not
//! reported. Everything around it (serial I/O, export, configuration) uses
//! [`TivuError`].

use thiserror::Error;

/// Main error type for tivu operations
#[derive(Debug, Error)]
pub enum TivuError {
    /// Transport-level errors (open, TTY setup, read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration or argument
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image export error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! GHCN-M Quality Control Library
//!
//! A Rust library for robust statistical quality control of monthly
//! climate station records in the fixed-width GHCN-M layout.
//!
//! This library provides tools for:
//! - Decoding and re-encoding fixed-width station/element/year rows
//! - Reconstructing per-station, per-element monthly time series from a
//!   sorted line stream without loading the whole file into memory
//! - Robust statistics (median with exact tie-break semantics, MAD)
//! - Per-calendar-month r-score computation with minimum-sample and
//!   zero-MAD policies
//! - Outlier filtering and re-serialization of the surviving series
//! - A JSON-lines diagnostic stream for auditing QC decisions

pub mod codec;
pub mod config;
pub mod constants;
pub mod grouper;
pub mod pipeline;
pub mod qc;
pub mod record;
pub mod rscore;
pub mod stats;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{QcConfig, ValueScaling};
pub use record::StationRecord;

/// Result type alias for the GHCN-M QC library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for GHCN-M QC operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Input line too short or a numeric field failed to parse
    #[error("malformed line {line_number}: {reason}")]
    MalformedLine { line_number: u64, reason: String },

    /// A statistic was requested for an empty sample
    #[error("statistics input is empty")]
    EmptyInput,

    /// Diagnostic record serialization failed
    #[error("diagnostic serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a malformed-line error for the given 1-based line number
    pub fn malformed_line(line_number: u64, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line_number,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// Automatic conversion from bare I/O errors
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

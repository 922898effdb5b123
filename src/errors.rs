//! Error types for the enrichment pipeline
//!
//! Splits failures into the three classes the drivers care about:
//! transient oracle errors (retried), permanent data errors (handled with
//! fallbacks at the call site), and fatal setup errors (abort the run).

use thiserror::Error;

/// Main error type for the enrichment pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration errors (bad config file, invalid values)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input table errors (missing file, missing columns, unreadable rows)
    #[error("Input error: {0}")]
    InputError(String),

    /// Missing or rejected API credential
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// Oracle API returned a non-success status
    #[error("Oracle API error: {0}")]
    OracleApiError(String),

    /// Oracle signalled throttling (HTTP 429)
    #[error("Oracle rate limited: {0}")]
    RateLimited(String),

    /// Oracle response did not match the stage's response contract
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// HTTP client errors (connect failures, timeouts)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

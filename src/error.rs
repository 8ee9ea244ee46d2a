//! Error types for the showcase layer
//!
//! Nothing here ever reaches the user as a hard failure: callers log the
//! error and fall back to an empty list, a fallback track or a placeholder.

use thiserror::Error;

/// Errors produced while loading manifests or probing the asset host
#[derive(Error, Debug)]
pub enum ShowcaseError {
    /// Manifest or persisted value was not valid JSON of the expected shape
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest parsed but had the wrong top-level shape
    #[error("Unexpected manifest shape: {0}")]
    Shape(String),

    /// Request completed with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Request never completed (offline, CORS, aborted)
    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// Directory listing was served with a non-HTML content type
    #[error("Not an HTML listing: {0}")]
    NotHtml(String),

    /// Browser storage is disabled or full
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

/// Result type for showcase operations
pub type Result<T> = std::result::Result<T, ShowcaseError>;

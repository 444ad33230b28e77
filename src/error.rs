//! Error types for inset
//!
//! All modules use `InsetResult<T>` as their return type. Render-side
//! degradations (rate limit, failed conversion) are not errors: they are
//! user-visible fallback strings produced by the render cache.

use thiserror::Error;

/// Result type alias for inset operations
pub type InsetResult<T> = Result<T, InsetError>;

/// All errors that can occur in inset
#[derive(Error, Debug)]
pub enum InsetError {
    // Environment errors
    #[error("Cannot insert contents because this environment does not support {lacking}")]
    FeatureUnsupported { lacking: String },

    // Network errors
    #[error("Request to {url} failed: {reason}")]
    NetworkFailure { url: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl InsetError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network failure for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NetworkFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FeatureUnsupported { .. } => {
                Some("Run with --no-cache to use an in-memory store")
            }
            Self::NetworkFailure { .. } => Some("Check the source URL is reachable"),
            _ => None,
        }
    }
}

//! Error types for curtain-audit.
//!
//! Only failures that prevent an audit from being *attempted* surface as
//! [`AuditError`]. Anything that goes wrong while probing the target site
//! is absorbed into a `warn` verdict instead.

use thiserror::Error;

/// Errors returned by the audit engine and its configuration layer.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The caller's anti-replay token was missing, malformed, expired, or
    /// signed for a different scope. No probe was issued.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Why the token was rejected.
        reason: String,
    },

    /// A configured site URL could not be parsed.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL as configured.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Shorthand for an [`AuditError::Unauthorized`] rejection.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Whether this error is an authorization rejection rather than a
    /// configuration or I/O problem.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// A convenience type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

//! Error types for locator parsing, condition resolution and provider access

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AutomationError>;

/// Errors surfaced by the query engine.
///
/// "Not found" is not an error on the core paths: a search that
/// matches nothing returns `Ok(None)`. `ElementNotFound` is only produced by
/// the `*_required` convenience helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AutomationError {
    /// The caller violated the API contract (e.g. an absent query string)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A grid address fragment without any recognizable row/column token
    #[error(
        "Invalid grid address '{input}'. Expected '<row>,<column>', 'row <r>', 'column <c>' or 'row <r>, column <c>'"
    )]
    InvalidGridAddress { input: String },

    /// A name that is not a key of the registry it was looked up in
    #[error("Unrecognized {kind} '{name}'")]
    Unrecognized { kind: String, name: String },

    /// A criterion that cannot be converted to the type its condition needs
    #[error("Invalid value '{value}' for {condition_type}: expected {expected}")]
    InvalidValue {
        condition_type: String,
        value: String,
        expected: String,
    },

    /// Raised by helpers that require an element to exist
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A wait elapsed without the awaited state appearing
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Failure reported by the automation tree provider
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// The provider does not implement the requested native operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Configuration input that could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AutomationError {
    /// Shorthand for a registry lookup miss
    pub fn unrecognized(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Unrecognized {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// True for the usage-error class, which must never be retried
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::InvalidGridAddress { .. }
                | Self::Unrecognized { .. }
                | Self::InvalidValue { .. }
        )
    }
}

impl From<serde_json::Error> for AutomationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for AutomationError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

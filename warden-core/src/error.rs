//! Error types for Warden.
//!
//! The cache and limiter have no failure modes in normal operation: a miss
//! is `None` and a rejection is `false`. Errors only arise while building
//! components from configuration or when a caller passes bad input.

use thiserror::Error;

/// Result type alias using `WardenError`.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Main error type for all Warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration value out of range or unparsable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl WardenError {
    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, WardenError::ValidationError(_))
    }
}

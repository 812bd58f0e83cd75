//! Core error types for the registration lookup service.
//!
//! Configuration problems surface at startup; validation problems surface
//! per request and carry the exact message returned to the caller.

use thiserror::Error;

/// Rejection of the caller-supplied plate before any browser work starts.
///
/// The `Display` text of each variant is the response body sent to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The `rego` query parameter was absent or empty
    #[error("Registration is required.")]
    Missing,

    /// The plate is longer than the lookup form accepts
    #[error("Registration must include a maximum of {max} characters.")]
    TooLong {
        /// Maximum accepted length in characters
        max: usize,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

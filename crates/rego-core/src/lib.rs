//! Rego Core - Foundation crate for the registration lookup service.
//!
//! This crate provides shared types, error handling, configuration management
//! and the page layout table that the other crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration and validation errors using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`layout`] - Named selector table describing the results page
//! - [`types`] - Shared newtypes and records (`Plate`, `VehicleRecord`, `LabelField`)
//!
//! # Example
//!
//! ```rust
//! use rego_core::{AppConfig, Plate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.server.port, 8000);
//!
//! let plate = Plate::parse(Some("ABC123"))?;
//! assert_eq!(plate.as_str(), "ABC123");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod layout;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, LookupConfig, ServerConfig};
pub use error::{ConfigError, ConfigResult, ValidationError};
pub use layout::{LabelValueField, PageLayout};
pub use types::{
    Insurance, LabelField, Plate, Registration, Vehicle, VehicleRecord, Weight, MAX_PLATE_LEN,
};

//! Rego Scraper - Registration lookup orchestration.
//!
//! This crate drives one browser session per lookup through the free
//! registration check form and extracts the vehicle and CTP insurance
//! details from the rendered results page.
//!
//! # Features
//!
//! - Bounded number of concurrent browser sessions
//! - Overall deadline per lookup, with the session closed on every exit path
//! - Invalid-registration detection before any extraction
//! - Positional extraction driven by a named [`rego_core::PageLayout`] table
//!
//! # Example
//!
//! ```rust,ignore
//! use rego_browser::BrowserEngine;
//! use rego_core::{AppConfig, Plate};
//! use rego_scraper::LookupEngine;
//! use std::sync::Arc;
//!
//! let config = AppConfig::load_with_env()?;
//! let engine = LookupEngine::new(
//!     Arc::new(BrowserEngine::with_config(config.browser)),
//!     config.lookup,
//!     config.layout,
//! );
//!
//! let record = engine.lookup(&Plate::parse(Some("ABC123"))?).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod lookup;
#[allow(missing_docs)]
pub mod parser;

// Re-export commonly used types
pub use error::{Result, ScrapeError};
pub use lookup::LookupEngine;
pub use parser::ResultParser;

#[cfg(test)]
pub(crate) mod fixtures;

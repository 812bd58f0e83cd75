//! Browser automation for the registration lookup form.
//!
//! Provides headless Chromium control behind two small traits: a
//! [`BrowserLauncher`] that opens isolated sessions and the
//! [`BrowserActions`] a session exposes (navigate, type, click, keypress,
//! network idle wait, screenshot, page markup, close).

pub mod actions;
pub mod engine;
pub mod error;
pub mod keys;
pub mod network;

pub use actions::{BrowserActions, BrowserLauncher};
pub use engine::{BrowserEngine, BrowserSession};
pub use error::{BrowserError, Result};

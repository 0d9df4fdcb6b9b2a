//! # Core Module
//!
//! Configuration and fixed reply texts for the reminder bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release

pub mod config;
pub mod replies;

// Re-export commonly used items
pub use config::{Config, SEND_TIMEOUT, SWEEP_INTERVAL};
pub use replies::{Language, Replies};

//! Shared domain types for CronForge: configuration and the common
//! error type used across crates.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

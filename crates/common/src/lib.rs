//! Reelcut Common Utilities
//!
//! Shared infrastructure for all Reelcut crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading and output policy defaults

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;

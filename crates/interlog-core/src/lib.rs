//! Interlog Core - Shared functionality for the interlog tool
//!
//! Standard paths, layered configuration and small text formatting helpers.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{Config, SummarizerConfig};
pub use paths::Paths;

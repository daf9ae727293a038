// src/utils/mod.rs
//! Common utilities
//!
//! - **Config**: layered configuration loading
//! - **Errors**: crate-wide error type and `Result` alias

pub mod config;
pub mod errors;

pub use self::config::{LoggingConfig, MetricsConfig, RedirectConfig};
pub use self::errors::{RedirectError, Result, Side, SignatureRule};

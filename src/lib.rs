//! geetest-config - configuration for the Geetest CAPTCHA provider
//!
//! This crate holds the provider id, secret key and fallback flag used by a
//! Geetest integration, and resolves them from TOML files and environment
//! variables.

pub mod config;
pub mod types;

pub use config::{ConfigLoader, GeetestConfig};
pub use types::ConfigError;

//! Configuration system for the Geetest CAPTCHA integration
//!
//! Provides a 3-tier configuration hierarchy:
//! 1. Environment overrides (highest priority)
//! 2. Config file `[captcha.geetest]` section (medium priority)
//! 3. Built-in defaults (lowest priority)

pub mod defaults;
mod geetest;
mod loader;
mod settings;

pub use geetest::GeetestConfig;
pub use loader::ConfigLoader;
pub use settings::{CaptchaSettings, ConfigFile};

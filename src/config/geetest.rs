//! Geetest CAPTCHA configuration record

use crate::config::defaults;
use crate::types::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials and fallback mode for the Geetest CAPTCHA provider.
///
/// Bound from the `captcha.geetest` section of the config file:
///
/// ```toml
/// [captcha.geetest]
/// geetest-id = "your-id"
/// geetest-key = "your-key"
/// new-failback = true
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeetestConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geetest_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    geetest_key: Option<String>,

    #[serde(default = "defaults::new_failback")]
    new_failback: bool,
}

impl GeetestConfig {
    /// Create an unconfigured record with fallback mode enabled
    pub fn new() -> Self {
        Self {
            geetest_id: None,
            geetest_key: None,
            new_failback: defaults::DEFAULT_NEW_FAILBACK,
        }
    }

    pub fn geetest_id(&self) -> Option<&str> {
        self.geetest_id.as_deref()
    }

    pub fn set_geetest_id(&mut self, id: impl Into<String>) {
        self.geetest_id = Some(id.into());
    }

    pub fn geetest_key(&self) -> Option<&str> {
        self.geetest_key.as_deref()
    }

    pub fn set_geetest_key(&mut self, key: impl Into<String>) {
        self.geetest_key = Some(key.into());
    }

    /// Whether the new fallback verification mode is used when the primary
    /// challenge fails
    pub fn new_failback(&self) -> bool {
        self.new_failback
    }

    /// Alias of [`GeetestConfig::new_failback`]
    pub fn is_new_failback(&self) -> bool {
        self.new_failback()
    }

    pub fn set_new_failback(&mut self, enabled: bool) {
        self.new_failback = enabled;
    }

    pub fn with_geetest_id(mut self, id: impl Into<String>) -> Self {
        self.set_geetest_id(id);
        self
    }

    pub fn with_geetest_key(mut self, key: impl Into<String>) -> Self {
        self.set_geetest_key(key);
        self
    }

    pub fn with_new_failback(mut self, enabled: bool) -> Self {
        self.set_new_failback(enabled);
        self
    }

    /// True when both the id and the key are present and non-blank
    pub fn is_configured(&self) -> bool {
        self.require_credentials().is_ok()
    }

    /// Return `(id, key)`, or the name of the first missing property
    pub fn require_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let id = non_blank(self.geetest_id()).ok_or(ConfigError::MissingField("geetest-id"))?;
        let key = non_blank(self.geetest_key()).ok_or(ConfigError::MissingField("geetest-key"))?;
        Ok((id, key))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Default for GeetestConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Keep the secret out of logs
impl fmt::Debug for GeetestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeetestConfig")
            .field("geetest_id", &self.geetest_id)
            .field("geetest_key", &self.geetest_key.as_ref().map(|_| "****"))
            .field("new_failback", &self.new_failback)
            .finish()
    }
}

//! Config file document shape

use crate::config::GeetestConfig;
use serde::{Deserialize, Serialize};

/// Top-level document. Only the `captcha` table is read so the section can
/// sit inside a larger application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub captcha: CaptchaSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptchaSettings {
    #[serde(default)]
    pub geetest: GeetestConfig,
}

//! Built-in defaults, file names and environment variable names

/// Fallback mode is on unless configured otherwise
pub const DEFAULT_NEW_FAILBACK: bool = true;

/// Project-local config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".geetest.toml";

/// Directory under the user config dir (e.g. ~/.config/geetest)
pub const USER_CONFIG_DIR: &str = "geetest";
pub const USER_CONFIG_FILE: &str = "config.toml";

pub const ENV_CONFIG_PATH: &str = "GEETEST_CONFIG";
pub const ENV_GEETEST_ID: &str = "GEETEST_ID";
pub const ENV_GEETEST_KEY: &str = "GEETEST_KEY";
pub const ENV_NEW_FAILBACK: &str = "GEETEST_NEW_FAILBACK";

pub(crate) fn new_failback() -> bool {
    DEFAULT_NEW_FAILBACK
}

/// Parse a boolean the way env overrides are usually written
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

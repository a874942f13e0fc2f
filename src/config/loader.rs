//! Configuration loader with 3-tier precedence
//!
//! Priority order (highest to lowest):
//! 1. Environment overrides (GEETEST_ID, GEETEST_KEY, GEETEST_NEW_FAILBACK)
//! 2. Config file (./.geetest.toml, $GEETEST_CONFIG or ~/.config/geetest/config.toml)
//! 3. Built-in defaults

use crate::config::defaults::{
    self, ENV_CONFIG_PATH, ENV_GEETEST_ID, ENV_GEETEST_KEY, ENV_NEW_FAILBACK,
};
use crate::config::{ConfigFile, GeetestConfig};
use crate::types::{ConfigError, Result};
use std::collections::HashMap;
use std::env::VarError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ConfigLoader {
    candidates: Vec<PathBuf>,
    explicit: bool,
}

impl ConfigLoader {
    /// Search the standard locations, in priority order:
    /// 1. ./.geetest.toml (project-specific)
    /// 2. $GEETEST_CONFIG (environment variable)
    /// 3. ~/.config/geetest/config.toml (user-global)
    pub fn new() -> Self {
        Self::search(
            std::env::current_dir().ok(),
            std::env::var(ENV_CONFIG_PATH).ok(),
            dirs::config_dir(),
        )
    }

    fn search(
        cwd: Option<PathBuf>,
        env_path: Option<String>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let mut candidates = Vec::new();

        if let Some(cwd) = cwd {
            candidates.push(cwd.join(defaults::PROJECT_CONFIG_FILE));
        }

        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            candidates.push(PathBuf::from(path));
        }

        if let Some(dir) = config_dir {
            candidates.push(
                dir.join(defaults::USER_CONFIG_DIR)
                    .join(defaults::USER_CONFIG_FILE),
            );
        }

        Self::with_candidates(candidates)
    }

    /// Use exactly this file; it must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
            explicit: true,
        }
    }

    /// Probe the given files in order; none of them needs to exist
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            explicit: false,
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// The config file that `load` would read, if any
    pub fn source(&self) -> Result<Option<PathBuf>> {
        if self.explicit {
            let path = &self.candidates[0];
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.clone()));
            }
            return Ok(Some(path.clone()));
        }

        for path in &self.candidates {
            debug!("Probing config file: {}", path.display());
            if path.is_file() {
                return Ok(Some(path.clone()));
            }
        }

        debug!("No config file found");
        Ok(None)
    }

    /// Resolve the configuration against the process environment
    pub fn load(&self) -> Result<GeetestConfig> {
        let mut env = HashMap::new();
        for name in [ENV_GEETEST_ID, ENV_GEETEST_KEY, ENV_NEW_FAILBACK] {
            if let Some(value) = read_env(name)? {
                env.insert(name, value);
            }
        }
        self.load_with_env(|name| env.get(name).cloned())
    }

    pub fn load_with_env<F>(&self, lookup: F) -> Result<GeetestConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.source()? {
            Some(path) => {
                let config = Self::read_file(&path)?;
                info!("Loaded Geetest config from {}", path.display());
                config
            }
            None => GeetestConfig::default(),
        };

        Self::apply_env_overrides(&mut config, lookup)?;
        Ok(config)
    }

    pub fn read_file(path: &Path) -> Result<GeetestConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse a TOML document containing a `[captcha.geetest]` table
    pub fn parse_str(content: &str) -> Result<GeetestConfig> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<GeetestConfig> {
        let doc: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(doc.captcha.geetest)
    }

    /// Apply environment overrides; empty values are ignored
    pub fn apply_env_overrides<F>(config: &mut GeetestConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        // Validate before touching the record so a bad value leaves it unchanged
        let new_failback = match get(ENV_NEW_FAILBACK) {
            Some(raw) => Some(defaults::parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidValue {
                    name: ENV_NEW_FAILBACK.to_string(),
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        if let Some(id) = get(ENV_GEETEST_ID) {
            debug!("Overriding geetest-id from {}", ENV_GEETEST_ID);
            config.set_geetest_id(id);
        }

        if let Some(key) = get(ENV_GEETEST_KEY) {
            debug!("Overriding geetest-key from {}", ENV_GEETEST_KEY);
            config.set_geetest_key(key);
        }

        if let Some(enabled) = new_failback {
            debug!("Overriding new-failback={} from {}", enabled, ENV_NEW_FAILBACK);
            config.set_new_failback(enabled);
        }

        Ok(())
    }
}

/// Read a process env var; a non-UTF-8 value is an error rather than "unset"
fn read_env(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const FULL: &str = r#"
[captcha.geetest]
geetest-id = "file-id"
geetest-key = "file-key"
new-failback = false
"#;

    #[test]
    fn test_search_order() {
        let loader = ConfigLoader::search(
            Some(PathBuf::from("/work")),
            Some("/etc/geetest.toml".to_string()),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(
            loader.candidates(),
            &[
                PathBuf::from("/work/.geetest.toml"),
                PathBuf::from("/etc/geetest.toml"),
                PathBuf::from("/home/u/.config/geetest/config.toml"),
            ]
        );
    }

    #[test]
    fn test_search_skips_empty_env_path() {
        let loader = ConfigLoader::search(None, Some(String::new()), None);
        assert!(loader.candidates().is_empty());
    }

    #[test]
    fn test_defaults_when_no_file() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_candidates(vec![dir.path().join("missing.toml")]);
        assert_eq!(loader.source().unwrap(), None);

        let config = loader.load_with_env(no_env).unwrap();
        assert_eq!(config, GeetestConfig::default());
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = TempDir::new().unwrap();
        let second = write(&dir, "second.toml", FULL);
        let third = write(&dir, "third.toml", "[captcha.geetest]\ngeetest-id = \"other\"\n");

        let loader =
            ConfigLoader::with_candidates(vec![dir.path().join("first.toml"), second.clone(), third]);
        assert_eq!(loader.source().unwrap(), Some(second));

        let config = loader.load_with_env(no_env).unwrap();
        assert_eq!(config.geetest_id(), Some("file-id"));
        assert_eq!(config.geetest_key(), Some("file-key"));
        assert!(!config.new_failback());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let loader = ConfigLoader::with_path(&missing);
        match loader.load_with_env(no_env) {
            Err(ConfigError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", FULL);
        let env = env_of(&[
            (ENV_GEETEST_KEY, "env-key"),
            (ENV_NEW_FAILBACK, "yes"),
            (ENV_GEETEST_ID, ""),
        ]);

        let config = ConfigLoader::with_path(path).load_with_env(env).unwrap();
        assert_eq!(config.geetest_id(), Some("file-id"));
        assert_eq!(config.geetest_key(), Some("env-key"));
        assert!(config.new_failback());
    }

    #[test]
    fn test_invalid_env_bool() {
        let mut config = GeetestConfig::default();
        let result =
            ConfigLoader::apply_env_overrides(&mut config, env_of(&[(ENV_NEW_FAILBACK, "maybe")]));
        match result {
            Err(ConfigError::InvalidValue { name, value }) => {
                assert_eq!(name, ENV_NEW_FAILBACK);
                assert_eq!(value, "maybe");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
        assert!(config.new_failback());
    }

    #[test]
    fn test_invalid_env_bool_leaves_record_unchanged() {
        let mut config = GeetestConfig::new().with_geetest_id("file-id");
        let env = env_of(&[
            (ENV_GEETEST_ID, "env-id"),
            (ENV_GEETEST_KEY, "env-key"),
            (ENV_NEW_FAILBACK, "maybe"),
        ]);

        assert!(ConfigLoader::apply_env_overrides(&mut config, env).is_err());
        assert_eq!(config.geetest_id(), Some("file-id"));
        assert_eq!(config.geetest_key(), None);
        assert!(config.new_failback());
    }

    #[test]
    fn test_read_env_unset() {
        assert_eq!(read_env("GEETEST_CONFIG_TEST_SURELY_UNSET").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_env_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = "GEETEST_CONFIG_TEST_NON_UTF8";
        std::env::set_var(name, OsStr::from_bytes(b"tr\xffue"));
        let result = read_env(name);
        std::env::remove_var(name);

        match result {
            Err(ConfigError::InvalidValue { name: n, .. }) => assert_eq!(n, name),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "[captcha.geetest]\nnew-failback = \"sometimes\"\n");
        match ConfigLoader::read_file(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_str() {
        let config = ConfigLoader::parse_str(FULL).unwrap();
        assert_eq!(config.geetest_id(), Some("file-id"));

        let config = ConfigLoader::parse_str("").unwrap();
        assert!(config.new_failback());
        assert!(!config.is_configured());
    }
}

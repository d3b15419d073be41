//! User settings with environment variable fallback.
//!
//! Credentials such as `GITHUB_TOKEN` are read from the environment first and
//! then from the `env` map in `$HOME/.semrel/settings.json`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Settings loaded from `$HOME/.semrel/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::settings_path()?)
    }

    /// Loads settings from a specific path; a missing file yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn settings_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".semrel").join("settings.json"))
    }

    /// Returns an environment variable, falling back to these settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Some(value) = env::var(key).ok().filter(|v| !v.is_empty()) {
        return Ok(value);
    }

    let settings = Settings::load().map_err(|e| {
        debug!("Could not load settings: {e:#}");
        anyhow!("Environment variable not found: {key}").context(e)
    })?;
    settings
        .get_env_var(key)
        .ok_or_else(|| anyhow!("Environment variable not found: {key}"))
}

/// Returns the first of several environment variables that is set.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow!("None of the environment variables found: {keys:?}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_settings(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "env": { "SEMREL_TEST_FALLBACK": "from_settings", "GITHUB_TOKEN": "ghp_test" } }"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn loads_env_map() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(write_settings(&dir)).unwrap();
        assert_eq!(settings.env["GITHUB_TOKEN"], "ghp_test");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(dir.path().join("nope.json")).unwrap();
        assert!(settings.env.is_empty());
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from_path(&path).is_err());
    }

    #[test]
    fn environment_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(write_settings(&dir)).unwrap();

        env::set_var("SEMREL_TEST_FALLBACK", "from_env");
        assert_eq!(
            settings.get_env_var("SEMREL_TEST_FALLBACK").unwrap(),
            "from_env"
        );

        env::remove_var("SEMREL_TEST_FALLBACK");
        assert_eq!(
            settings.get_env_var("SEMREL_TEST_FALLBACK").unwrap(),
            "from_settings"
        );
        assert!(settings.get_env_var("SEMREL_TEST_UNSET").is_none());
    }

    #[test]
    fn get_env_vars_returns_first_set() {
        env::set_var("SEMREL_TEST_SECOND", "second");
        let value = get_env_vars(&["SEMREL_TEST_FIRST_UNSET", "SEMREL_TEST_SECOND"]).unwrap();
        assert_eq!(value, "second");
        env::remove_var("SEMREL_TEST_SECOND");
    }
}

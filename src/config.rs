use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::app_dir;

pub const CONFIG_FILE: &str = "promptmesh.json";

/// Whether a failed key exchange is shown to the user or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFailureMode {
    #[default]
    Silent,
    Visible,
}

impl std::str::FromStr for AuthFailureMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(AuthFailureMode::Silent),
            "visible" => Ok(AuthFailureMode::Visible),
            other => Err(Error::Config(format!("unknown auth failure mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub auth_base: String,
    pub referer: String,
    pub title: String,
    pub server_port: u16,
    pub dist_dir: PathBuf,
    pub auth_failure_mode: AuthFailureMode,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://openrouter.ai".to_string(),
            auth_base: "https://openrouter.ai".to_string(),
            referer: "https://test.com".to_string(),
            title: "test".to_string(),
            server_port: 21296,
            dist_dir: PathBuf::from("dist"),
            auth_failure_mode: AuthFailureMode::Silent,
            store_path: None,
        }
    }
}

impl Config {
    /// Loads `promptmesh.json` from the app directory, then applies env overrides.
    pub fn load() -> Result<Self> {
        let file_path = app_dir()?.join(CONFIG_FILE);
        let mut config = Self::from_file(&file_path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Missing file means defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("PROMPTMESH_API_BASE") {
            self.api_base = base;
        }
        if let Some(base) = lookup("PROMPTMESH_AUTH_BASE") {
            self.auth_base = base;
        }
        if let Some(port) = lookup("PROMPTMESH_PORT") {
            self.server_port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid PROMPTMESH_PORT: {}", port)))?;
        }
        if let Some(mode) = lookup("PROMPTMESH_AUTH_FAILURE") {
            self.auth_failure_mode = mode.parse()?;
        }
        Ok(())
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(app_dir()?.join("credentials.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_openrouter() {
        let config = Config::default();
        assert_eq!(config.api_base, "https://openrouter.ai");
        assert_eq!(config.server_port, 21296);
        assert_eq!(config.auth_failure_mode, AuthFailureMode::Silent);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"title":"mesh studio","auth_failure_mode":"visible"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.title, "mesh studio");
        assert_eq!(config.auth_failure_mode, AuthFailureMode::Visible);
        assert_eq!(config.referer, "https://test.com");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("PROMPTMESH_API_BASE", "http://127.0.0.1:9000"),
            ("PROMPTMESH_PORT", "4000"),
            ("PROMPTMESH_AUTH_FAILURE", "Visible"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.auth_base, "https://openrouter.ai");
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.auth_failure_mode, AuthFailureMode::Visible);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "PROMPTMESH_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;

/// Runtime configuration, read from ~/.ai-swap/config.yaml
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub upload_path: String,
    pub professions_path: String,
    pub swap_path: String,
    pub health_path: String,
    pub request_timeout_secs: u64,
    pub download_dir: PathBuf,
    pub notification_ttl_secs: u64,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            professions_path: DEFAULT_PROFESSIONS_PATH.to_string(),
            swap_path: DEFAULT_SWAP_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load from the home config directory, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);

        let config = Self::load_from(&config_dir)?;
        Ok(config.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_DOWNLOAD_DIR).ok(),
        ))
    }

    /// Load `config.yaml` from a directory; a missing file yields defaults
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join("config.yaml");
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_yaml::from_str::<Config>(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn with_overrides(mut self, api_url: Option<String>, download_dir: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = download_dir.filter(|d| !d.trim().is_empty()) {
            self.download_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn upload_url(&self) -> String {
        self.endpoint(&self.upload_path)
    }

    pub fn professions_url(&self) -> String {
        self.endpoint(&self.professions_path)
    }

    pub fn swap_url(&self) -> String {
        self.endpoint(&self.swap_path)
    }

    pub fn health_url(&self) -> String {
        self.endpoint(&self.health_path)
    }

    /// Resolve a service URL that may be relative to the base URL
    pub fn resolve_url(&self, url: &str) -> String {
        if reqwest::Url::parse(url).is_ok() {
            return url.to_string();
        }
        reqwest::Url::parse(&self.api_base_url)
            .and_then(|base| base.join(url))
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|_| url.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.upload_url(), "http://localhost:8000/api/upload");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "api_base_url: https://swap.example.com/\nrequest_timeout_secs: 5\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.swap_url(), "https://swap.example.com/api/swap");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.health_path, DEFAULT_HEALTH_PATH);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "request_timeout_secs: [nope").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("http://10.0.0.2:9000".into()), Some("".into()));
        assert_eq!(config.professions_url(), "http://10.0.0.2:9000/api/professions");
        assert_eq!(config.download_dir, Config::default().download_dir);
    }

    #[test]
    fn test_resolve_relative_result_url() {
        let config = Config::default().with_overrides(Some("http://10.0.0.2:9000/".into()), None);
        assert_eq!(
            config.resolve_url("/results/abc.jpg"),
            "http://10.0.0.2:9000/results/abc.jpg"
        );
        assert_eq!(
            config.resolve_url("https://cdn.example.com/r.jpg"),
            "https://cdn.example.com/r.jpg"
        );
    }
}

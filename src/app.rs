use crate::error::{ChatError, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HTTP_ENDPOINT: &str = "http://localhost:8080";
pub const DEFAULT_WS_ENDPOINT: &str = "ws://localhost:8081/ws";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub http_endpoint: String,
    pub ws_endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_string(),
            ws_endpoint: DEFAULT_WS_ENDPOINT.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("tandem-chat.toml"))
    }

    /// Reads the default config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        match Self::toml_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("ignoring config at {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ChatError::Config(e.to_string()))?;
        let mut config: AppConfig =
            toml::from_str(&text).map_err(|e| ChatError::Config(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ChatError::Config(e.to_string()))?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        fs::write(path, toml).map_err(|e| ChatError::Config(e.to_string()))
    }

    pub fn normalize(&mut self) {
        self.http_endpoint = crate::utils::normalize_url(&self.http_endpoint, "http");
        self.ws_endpoint = crate::utils::normalize_url(&self.ws_endpoint, "ws");
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

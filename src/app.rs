use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::session::SessionStore;
use crate::state::Route;

pub const DEFAULT_API_URL: &str = "http://localhost:8081/api";
pub const API_URL_ENV: &str = "BIGCHAT_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub conversation_refresh_secs: u64,
    pub message_refresh_secs: u64,
    pub reconcile_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            conversation_refresh_secs: 15,
            message_refresh_secs: 5,
            reconcile_delay_ms: 300,
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("bigchat.toml"))
    }

    /// Reads `bigchat.toml` from the user config dir, then applies the
    /// `BIGCHAT_API_URL` override. Anything unreadable falls back to defaults.
    pub fn load() -> Self {
        let from_file = Self::toml_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        from_file.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            return Self::default();
        };
        match Self::from_toml_str(&text) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring invalid config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_url = crate::utils::normalize_url(&url);
        }
        self
    }

    pub fn api_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.api_url.trim())
    }

    pub fn conversation_refresh(&self) -> Duration {
        Duration::from_secs(self.conversation_refresh_secs.max(1))
    }

    pub fn message_refresh(&self) -> Duration {
        Duration::from_secs(self.message_refresh_secs.max(1))
    }

    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.reconcile_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Where the app should start: home needs a session, anything else goes to login.
pub fn initial_route(session: &SessionStore) -> Route {
    if session.is_authenticated() {
        Route::Home
    } else {
        Route::Login
    }
}

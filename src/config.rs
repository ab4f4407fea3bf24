use crate::constants::{
    APP_DIR_NAME, AUTH_CALLBACK_PATH, DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_BACKEND_URL,
    DEFAULT_CALLBACK_ADDR, DEFAULT_NOTIFICATION_SECS, DEFAULT_POPUP_HEIGHT,
    DEFAULT_POPUP_POLL_MS, DEFAULT_POPUP_WIDTH, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the console backend, without the `/api` suffix.
    pub backend_url: String,
    /// Origins trusted to deliver authorization codes, in addition to the
    /// backend and loopback callback origins.
    pub allowed_origins: Vec<String>,
    pub popup_width: u32,
    pub popup_height: u32,
    pub notification_secs: u64,
    pub popup_poll_ms: u64,
    /// Zero disables the timeout.
    pub auth_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub callback_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            allowed_origins: Vec::new(),
            popup_width: DEFAULT_POPUP_WIDTH,
            popup_height: DEFAULT_POPUP_HEIGHT,
            notification_secs: DEFAULT_NOTIFICATION_SECS,
            popup_poll_ms: DEFAULT_POPUP_POLL_MS,
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            callback_addr: DEFAULT_CALLBACK_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR_NAME);
        path
    }

    pub fn config_file() -> PathBuf {
        let mut path = Self::config_dir();
        path.push("config.toml");
        path
    }

    /// Loads the config from the default location, writing defaults on first run.
    pub fn load() -> Self {
        Self::load_from(&Self::config_file())
    }

    /// Loads the config at `path`. A missing or unreadable file yields the
    /// defaults, which are then written back to `path`.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring malformed config {:?}: {}", path, e),
                },
                Err(e) => tracing::warn!("Failed to read config {:?}: {}", path, e),
            }
            return Self::default();
        }
        let default = Self::default();
        if let Err(e) = default.save_to(path) {
            tracing::debug!("Could not write default config: {}", e);
        }
        default
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Backend URL with any trailing slash removed.
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Default redirect URI offered when creating a profile.
    pub fn default_redirect_uri(&self) -> String {
        format!("{}{}", self.backend_base(), AUTH_CALLBACK_PATH)
    }

    /// Every origin trusted to post authorization codes: the backend (which
    /// serves the callback page), the loopback callback and configured extras.
    pub fn trusted_origins(&self) -> Vec<String> {
        let mut origins = Vec::new();
        let candidates = std::iter::once(self.backend_url.clone())
            .chain(std::iter::once(format!("http://{}", self.callback_addr)))
            .chain(self.allowed_origins.iter().cloned());
        for candidate in candidates {
            match origin_of(&candidate) {
                Some(origin) if !origins.contains(&origin) => origins.push(origin),
                Some(_) => {}
                None => tracing::warn!("Skipping invalid origin in config: {}", candidate),
            }
        }
        origins
    }

    pub fn popup_poll_interval(&self) -> Duration {
        Duration::from_millis(self.popup_poll_ms.max(1))
    }

    pub fn auth_timeout(&self) -> Option<Duration> {
        (self.auth_timeout_secs > 0).then(|| Duration::from_secs(self.auth_timeout_secs))
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Serialized origin (`scheme://host[:port]`) of a URL, if it has one.
pub fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

//! Application configuration. Backend URL, storage path, timeouts.

use serde::Deserialize;

use crate::adapters::backend::DEFAULT_API_BASE_URL;

pub const DEFAULT_SESSION_PATH: &str = "./data/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Backend REST root. Read from PETGATE_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// File backing the client-local session slots. Read from PETGATE_SESSION_PATH.
    #[serde(default)]
    pub session_path: Option<String>,

    /// Per-request HTTP timeout in seconds (default 10). Read from PETGATE_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Use the in-memory demo backend instead of HTTP. Read from PETGATE_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("PETGATE").try_parsing(true));
        if let Ok(path) = std::env::var("PETGATE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the backend root without a trailing slash.
    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string())
    }

    /// Returns the request timeout in seconds. Zero is treated as unset.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }
}

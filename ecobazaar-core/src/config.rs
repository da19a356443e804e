//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8080/api", "timeoutMs": 15000 },
//!   "routes": { "login": "/login", "public": ["/", "/login", "/register"] }
//! }
//! ```
//! Fields this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::reqwest_transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    routes: RouteSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public: Option<Vec<String>>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration (resolved view of settings + environment)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub timeout_ms: u64,
    /// Where a forced logout sends the user
    pub login_route: String,
    /// Routes reachable without a session; a forced logout never redirects
    /// away from these (or their sub-paths, except `/` which is exact)
    pub public_routes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            login_route: "/login".to_string(),
            public_routes: vec!["/".to_string(), "/login".to_string(), "/register".to_string()],
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The API location can be overridden with ECOBAZAAR_API_BASE and
    /// ECOBAZAAR_TIMEOUT_MS (for CI/testing against a local backend).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let defaults = Self::default();

        let api_base_url = std::env::var("ECOBAZAAR_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or(raw.api.base_url)
            .unwrap_or(defaults.api_base_url);

        let timeout_ms = match std::env::var("ECOBAZAAR_TIMEOUT_MS") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("Invalid ECOBAZAAR_TIMEOUT_MS value '{}'", value))?,
            Err(_) => raw.api.timeout_ms.unwrap_or(defaults.timeout_ms),
        };

        Ok(Self {
            api_base_url,
            timeout_ms,
            login_route: raw.routes.login.unwrap_or(defaults.login_route),
            public_routes: raw.routes.public.unwrap_or(defaults.public_routes),
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.api.base_url = Some(self.api_base_url.clone());
        settings.api.timeout_ms = Some(self.timeout_ms);
        settings.routes.login = Some(self.login_route.clone());
        settings.routes.public = Some(self.public_routes.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)
            .with_context(|| format!("Failed to write settings in {}", data_dir.display()))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

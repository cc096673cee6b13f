use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = Url::parse(&self.store.endpoint)
            .map_err(|e| format!("store.endpoint is not a valid URL: {e}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err("store.endpoint must use http or https".into());
        }
        if self.store.timeout_ms == 0 {
            return Err("store.timeout_ms must be > 0".into());
        }
        if self.store.region.trim().is_empty() {
            return Err("store.region must not be empty".into());
        }
        if matches!(self.store.token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err("store.token must not be empty when set".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Bearer token; prefer EDGEPLANE__STORE__TOKEN over the file
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_endpoint() -> String {
    "http://localhost:8080".into()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_region() -> String {
    "us-east-1".into()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            token: None,
            region: default_region(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "warn".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    const DEFAULT_FILE: &str = "edgeplane.toml";

    /// Candidate files when no path is given: the working directory first,
    /// then `~/.edgeplane/`.
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".edgeplane").join(DEFAULT_FILE));
        }
        paths
    }

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file {p} does not exist"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                if let Some(found) = default_paths().into_iter().find(|p| p.exists()) {
                    builder = builder.add_source(File::from(found));
                }
            }
        }
        // Environment variable overrides, e.g., EDGEPLANE__STORE__TIMEOUT_MS=5000
        builder = builder.add_source(
            Environment::with_prefix("EDGEPLANE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

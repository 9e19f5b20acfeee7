//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Backend credentials are the only required values. They are checked when a
//! client is constructed, never defaulted: there is no built-in development
//! backend.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiConfig;

/// Environment variable holding the backend endpoint URL
pub const ENV_BACKEND_URL: &str = "ORGANISER_BACKEND_URL";
/// Environment variable holding the backend anonymous key
pub const ENV_BACKEND_ANON_KEY: &str = "ORGANISER_BACKEND_ANON_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Endpoint URL, e.g. `https://abc.supabase.co`
    pub url: Option<String>,

    /// Anonymous (public) API key
    pub anon_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Deadline applied to each page query
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,

    /// How long a cached page query stays fresh
    #[serde(default = "default_cache_stale")]
    pub cache_stale_secs: u64,

    /// How long a resolved role is memoized
    #[serde(default = "default_role_ttl")]
    pub role_ttl_secs: u64,
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_query_timeout() -> u64 {
    8_000
}

fn default_cache_stale() -> u64 {
    30
}

fn default_role_ttl() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            request_timeout_ms: default_request_timeout(),
            query_timeout_ms: default_query_timeout(),
            cache_stale_secs: default_cache_stale(),
            role_ttl_secs: default_role_ttl(),
        }
    }
}

impl BackendConfig {
    /// Validated credentials, or a configuration error naming the missing value
    pub fn credentials(&self) -> Result<BackendCredentials, ConfigError> {
        BackendCredentials::new(
            self.url.clone().unwrap_or_default(),
            self.anon_key.clone().unwrap_or_default(),
        )
    }
}

/// Endpoint URL and anonymous key for the hosted backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub url: String,
    pub anon_key: String,
}

impl BackendCredentials {
    /// Fails fast if either value is empty
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.into().trim().to_string();

        if url.is_empty() {
            return Err(ConfigError::Missing(ENV_BACKEND_URL));
        }
        if anon_key.is_empty() {
            return Err(ConfigError::Missing(ENV_BACKEND_ANON_KEY));
        }

        Ok(Self { url, anon_key })
    }

    /// Read both values from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(ENV_BACKEND_URL).map_err(|_| ConfigError::Missing(ENV_BACKEND_URL))?;
        let anon_key =
            std::env::var(ENV_BACKEND_ANON_KEY).map_err(|_| ConfigError::Missing(ENV_BACKEND_ANON_KEY))?;
        Self::new(url, anon_key)
    }
}

/// Local preference storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

fn default_preferences_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("organiser").join("preferences.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./organiser_preferences.json".to_string())
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the configured level when set.
    pub fn init(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("organiser={},tower_http=info", self.level).into()
        });

        let registry = tracing_subscriber::registry().with(filter);

        if self.format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Load failures are logged here, so a subscriber must already be
    /// installed. Binaries use [`Config::discover`] instead and report once
    /// logging is up.
    pub fn load_default() -> Self {
        let discovery = Self::discover();
        discovery.report();
        discovery.config
    }

    /// Search the default locations without logging anything
    pub fn discover() -> ConfigDiscovery {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("organiser").join("config.toml")),
            Some(PathBuf::from("/etc/organiser/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::discover_in(&config_paths, |name| std::env::var(name).ok())
    }

    fn discover_in(paths: &[PathBuf], var: impl Fn(&str) -> Option<String>) -> ConfigDiscovery {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load(path) {
                Ok(mut config) => {
                    config.apply_overrides(&var);
                    return ConfigDiscovery {
                        config,
                        source: Some(path.clone()),
                        failures,
                    };
                }
                Err(e) => failures.push(e),
            }
        }

        let mut config = Config::default();
        config.apply_overrides(&var);
        ConfigDiscovery {
            config,
            source: None,
            failures,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(&|name: &str| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        // Backend
        if let Some(url) = var(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = var(ENV_BACKEND_ANON_KEY) {
            self.backend.anon_key = Some(key);
        }

        // API
        if let Some(host) = var("ORGANISER_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("ORGANISER_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }
        if let Some(key) = var("ORGANISER_MAP_KEY") {
            self.api.map_key = Some(key);
        }

        // Preferences
        if let Some(path) = var("ORGANISER_PREFERENCES_PATH") {
            self.preferences.path = path;
        }

        // Logging
        if let Some(level) = var("ORGANISER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ORGANISER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the default config locations
#[derive(Debug)]
pub struct ConfigDiscovery {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but could not be loaded, in search order
    pub failures: Vec<ConfigError>,
}

impl ConfigDiscovery {
    /// Log where the config came from and every file that was skipped
    pub fn report(&self) {
        for failure in &self.failures {
            tracing::warn!("Skipping config: {}", failure);
        }

        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Missing required configuration value {0}")]
    Missing(&'static str),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Organiser Configuration
#
# Environment variables override these settings:
# - ORGANISER_BACKEND_URL
# - ORGANISER_BACKEND_ANON_KEY
# - ORGANISER_API_HOST
# - ORGANISER_API_PORT
# - ORGANISER_MAP_KEY
# - ORGANISER_PREFERENCES_PATH
# - ORGANISER_LOG_LEVEL
# - ORGANISER_LOG_FORMAT

[backend]
# Hosted backend endpoint and anonymous key (both required)
# url = "https://your-project.supabase.co"
# anon_key = ""

# HTTP request timeout (ms)
request_timeout_ms = 10000

# Deadline for each page query (ms)
query_timeout_ms = 8000

# Page query cache freshness (seconds)
cache_stale_secs = 30

# Role memo lifetime (seconds)
role_ttl_secs = 60

[api]
# Map-key function host and port
host = "0.0.0.0"
port = 8086

# Third-party map service key returned to signed-in callers
# map_key = ""

[preferences]
# Where the theme preference is stored
# path = "~/.config/organiser/preferences.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.backend.query_timeout_ms, 8000);
        assert_eq!(config.backend.role_ttl_secs, 60);
        assert_eq!(config.api.port, 8086);
        assert!(config.backend.url.is_none());
        assert!(config.api.map_key.is_none());
    }

    #[test]
    fn test_credentials_fail_fast() {
        let err = BackendCredentials::new("", "anon").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_BACKEND_URL)));

        let err = BackendCredentials::new("https://db.example.org", "  ").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_BACKEND_ANON_KEY)));

        let err = BackendConfig::default().credentials().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_BACKEND_URL)));
    }

    #[test]
    fn test_credentials_normalize_url() {
        let creds = BackendCredentials::new("https://db.example.org/", "anon").unwrap();
        assert_eq!(creds.url, "https://db.example.org");
        assert_eq!(creds.anon_key, "anon");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "https://db.example.org"),
            (ENV_BACKEND_ANON_KEY, "anon"),
            ("ORGANISER_API_PORT", "9000"),
            ("ORGANISER_MAP_KEY", "maps-123"),
            ("ORGANISER_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(&|name: &str| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.backend.url.as_deref(), Some("https://db.example.org"));
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.map_key.as_deref(), Some("maps-123"));
        assert_eq!(config.logging.format, "json");
        assert!(config.backend.credentials().is_ok());
    }

    #[test]
    fn test_invalid_port_ignored() {
        let mut config = Config::default();
        config.apply_overrides(&|name: &str| (name == "ORGANISER_API_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.api.port, ApiConfig::default().port);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/organiser.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_discover_reports_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[api]\nport = \"not a number\"\n").unwrap();
        std::fs::write(&good, "[api]\nport = 9100\n").unwrap();

        let no_env = |_: &str| -> Option<String> { None };
        let missing = dir.path().join("missing.toml");

        let found = Config::discover_in(&[missing.clone(), broken.clone(), good.clone()], no_env);
        assert_eq!(found.source.as_deref(), Some(good.as_path()));
        assert_eq!(found.config.api.port, 9100);
        assert_eq!(found.failures.len(), 1);
        assert!(matches!(&found.failures[0], ConfigError::Parse { path, .. } if path == &broken));

        let fallback = Config::discover_in(&[broken.clone()], no_env);
        assert!(fallback.source.is_none());
        assert_eq!(fallback.config.api.port, ApiConfig::default().port);
        assert_eq!(fallback.failures.len(), 1);
    }

    #[test]
    fn test_discover_applies_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let found = Config::discover_in(&[path], |name: &str| {
            (name == "ORGANISER_MAP_KEY").then(|| "maps-123".to_string())
        });
        assert!(found.failures.is_empty());
        assert_eq!(found.config.logging.level, "debug");
        assert_eq!(found.config.api.map_key.as_deref(), Some("maps-123"));
    }
}

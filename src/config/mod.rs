//! Configuration management
//!
//! This module handles loading and parsing configuration for the Nurtura
//! service. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Outgoing email configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Site configuration
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path or ":memory:"
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/nurtura.db".to_string()
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached queries
    #[serde(default = "default_cache_capacity")]
    pub max_entries: u64,
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_capacity(),
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    3600
}

/// Outgoing email (SMTP) configuration for magic-link sign-in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host; magic links are logged instead of sent when unset
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// From address for outgoing mail
    #[serde(default = "default_smtp_from")]
    pub from_address: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "Nurtura <no-reply@nurtura.app>".to_string()
}

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base URL used in magic links
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default locale; links for this locale carry no path prefix
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Default language tag for new editorial posts
    #[serde(default = "default_locale")]
    pub default_language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_locale: default_locale(),
            default_language: default_locale(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_locale() -> String {
    "sv".to_string()
}

impl SiteConfig {
    /// Build the post-login redirect path for a locale.
    ///
    /// The default locale is unprefixed (`/app`); any other locale gets a
    /// path prefix (`/en/app`).
    pub fn app_path(&self, locale: &str) -> String {
        if locale == self.default_locale {
            "/app".to_string()
        } else {
            format!("/{}/app", locale)
        }
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Config {
    /// Load configuration from a YAML file, then apply environment
    /// variable overrides. A missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
                path: path.display().to_string(),
                source,
            })?;
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply NURTURA_* environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NURTURA_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NURTURA_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("NURTURA_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Ok(url) = std::env::var("NURTURA_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(base_url) = std::env::var("NURTURA_BASE_URL") {
            self.site.base_url = base_url;
        }
        if let Ok(host) = std::env::var("NURTURA_SMTP_HOST") {
            self.email.smtp_host = Some(host);
        }
        if let Ok(username) = std::env::var("NURTURA_SMTP_USERNAME") {
            self.email.smtp_username = Some(username);
        }
        if let Ok(password) = std::env::var("NURTURA_SMTP_PASSWORD") {
            self.email.smtp_password = Some(password);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/nurtura.db");
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.site.default_locale, "sv");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9000\nsite:\n  default_locale: en\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.site.default_locale, "en");
        // Unset sections fall back to defaults
        assert_eq!(config.database.url, "data/nurtura.db");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not a map").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_app_path_locale_prefix() {
        let site = SiteConfig::default();
        assert_eq!(site.app_path("sv"), "/app");
        assert_eq!(site.app_path("en"), "/en/app");
    }
}

//! Configuration loading
//!
//! Values come from an optional TOML file, then `WORKLY__SECTION__KEY`
//! environment variables. Command line flags are applied on top in `main`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment prefix; `WORKLY__SERVER__PORT=8080` sets `server.port`
const ENV_PREFIX: &str = "WORKLY";
const ENV_SEPARATOR: &str = "__";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds in-flight requests get to finish once shutdown starts
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Signing secrets for the two session kinds.
///
/// Either may be left unset; sign-in and guarded routes for that kind then
/// answer 500 until a secret is provided.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub user_secret: Option<String>,
    #[serde(default)]
    pub company_secret: Option<String>,
    /// Mark session cookies `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_database_url() -> String {
    "sqlite:./data/workly.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file (if present) and the process environment
    pub fn load(path: &str) -> Result<Self> {
        let env = ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true);

        Self::load_with_env(path, env)
    }

    fn load_with_env(path: &str, env: ::config::Environment) -> Result<Self> {
        let file_present = Path::new(path).exists();
        if file_present {
            info!("Loading configuration from {}", path);
        } else {
            info!("Config file not found at {}, using defaults", path);
        }

        let config: Config = ::config::Config::builder()
            .add_source(
                ::config::File::from(Path::new(path))
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))?;

        Ok(config)
    }
}

impl ServerConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl AuthConfig {
    /// Both kinds are configured with the same non-empty secret
    pub fn shares_secret(&self) -> bool {
        match (self.user_secret.as_deref(), self.company_secret.as_deref()) {
            (Some(user), Some(company)) => !user.is_empty() && user == company,
            _ => false,
        }
    }
}

impl DatabaseConfig {
    /// Directory that must exist before SQLite can create the database file
    pub fn parent_dir(&self) -> Option<PathBuf> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);

        if path.is_empty() || path == ":memory:" {
            return None;
        }

        Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

//! Configuration management for arte
//!
//! Settings are layered: built-in defaults, then a TOML file, then the
//! `ARTE_*` environment variables, then command-line flags. Every section is
//! optional in the file.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ClientConfig;
use crate::cli::{GlobalArgs, ReporterConfig};
use crate::constants::{env as env_constants, http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Server connection settings
    pub server: ServerConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Status line settings
    pub progress: ReporterConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// File the settings were read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Which server to talk to and how to authenticate
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the service
    pub url: Option<String>,
    /// Value of the `Authorization` header
    pub token: Option<String>,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Whole-request timeout (unset = none)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Connection pool idle timeout (unset = none)
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// TCP keep-alive interval (unset = disabled)
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// Largest download accepted, in bytes
    pub max_response_size: u64,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            connect_timeout: http::CONNECT_TIMEOUT,
            request_timeout: None,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            max_response_size: limits::MAX_RESPONSE_SIZE,
            user_agent: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given (error, warn, info, debug, trace)
    pub level: Option<String>,
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// Command-line flags are applied afterwards with
    /// [`apply_cli_overrides`](Self::apply_cli_overrides).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `config_file_override` names a
    /// missing file, or a read/parse error for an unusable file
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound { path }),
            Some(path) => Some(path),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => {
                let mut config = Self::load_from_file(&path).await?;
                config.source = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `ARTE_URL` and `ARTE_TOKEN`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            env::var(env_constants::URL).ok(),
            env::var(env_constants::TOKEN).ok(),
        );
    }

    /// Apply `--url` and `--token`
    pub fn apply_cli_overrides(&mut self, global: &GlobalArgs) {
        self.apply_overrides(global.url.clone(), global.token.clone());
    }

    fn apply_overrides(&mut self, url: Option<String>, token: Option<String>) {
        if let Some(url) = url.filter(|value| !value.trim().is_empty()) {
            self.server.url = Some(url);
        }
        if let Some(token) = token.filter(|value| !value.is_empty()) {
            self.server.token = Some(token);
        }
    }

    /// Effective server URL
    pub fn server_url(&self) -> &str {
        self.server.url.as_deref().unwrap_or(http::DEFAULT_BASE_URL)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from("./arte.toml")];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }
        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/arte/config.toml"));

        search_paths.into_iter().find(|path| path.exists())
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("arte").join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(toml::from_str(&content)?)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            pool_idle_timeout: self.pool_idle_timeout,
            tcp_keepalive: self.tcp_keepalive,
            max_response_size: self.max_response_size,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
        }
    }
}

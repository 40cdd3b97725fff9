//! Application configuration.
//!
//! Values are layered: built-in defaults, the TOML config file, then
//! `GTUVERSE__SECTION__KEY` environment variables. CLI flags are applied on
//! top by the binary.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

pub const APP_NAME: &str = "gtuverse";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub proxy: ProxyConfig,
    pub client: ClientConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Settings for the `serve` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origin of the room backend requests are forwarded to
    pub backend_url: String,
    /// Largest inbound request body accepted for forwarding
    pub max_body_bytes: usize,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            backend_url: "http://localhost:18080".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

/// Settings for the client commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a running proxy
    pub proxy_url: String,
    /// Language of user-facing messages
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://localhost:3000".to_string(),
            locale: Locale::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Load configuration from `path` (optional) and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let defaults = AppConfig::default();
        let built = Config::builder()
            .set_default("logging.level", defaults.logging.level)?
            .set_default("proxy.host", defaults.proxy.host)?
            .set_default("proxy.port", i64::from(defaults.proxy.port))?
            .set_default("proxy.backend_url", defaults.proxy.backend_url)?
            .set_default("client.proxy_url", defaults.client.proxy_url)?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(&env_prefix()).separator("__"))
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        built
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Render the default configuration with a short header.
    pub fn default_toml(path: &Path) -> Result<String> {
        let toml = toml::to_string_pretty(&AppConfig::default())
            .context("serializing default config to TOML")?;
        let mut body = String::new();
        body.push_str("# Configuration for ");
        body.push_str(APP_NAME);
        body.push('\n');
        body.push_str("# File: ");
        body.push_str(&path.display().to_string());
        body.push_str("\n\n");
        body.push_str(&toml);
        Ok(body)
    }
}

/// Environment variable prefix derived from the app name.
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

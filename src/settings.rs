//! Server configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional `talkcal.toml`
//! in the working directory, then `TALKCAL__`-prefixed environment variables
//! (`TALKCAL__SERVER__PORT=8080`, `TALKCAL__CALENDAR__TIMEZONE=Europe/Berlin`).

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use talkcal_core::CalendarOptions;

const CONFIG_FILE: &str = "talkcal";
const ENV_PREFIX: &str = "TALKCAL";

/// 10 MiB
const DEFAULT_MAX_UPLOAD_BYTES: i64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
    #[serde(default)]
    pub calendar: CalendarOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used in attachment links, e.g. `https://talks.example.org`
    pub base_url: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured public origin, else one derived from host and port.
    pub fn public_url(&self) -> String {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}", self.bind_addr()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    /// Largest accepted request body
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub level: String,
}

impl Settings {
    /// Load from `talkcal.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::build(
            defaults()?
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// Load from the defaults plus one TOML file.
    #[cfg(test)]
    pub fn from_file(path: &str) -> Result<Self> {
        Self::build(defaults()?.add_source(File::with_name(path)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 3000)?
        .set_default("uploads.dir", "uploads")?
        .set_default("uploads.max_bytes", DEFAULT_MAX_UPLOAD_BYTES)?
        .set_default("logging.level", "info,tower_http=debug")?)
}

//! # configs
//!
//! Layered settings for the Wildlog binaries.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `wildlog.toml` (or the file named by `WILDLOG_CONFIG`), optional
//! 3. environment variables, `WILDLOG__SECTION__KEY`, e.g. `WILDLOG__SERVER__PORT=8080`
//!
//! A `.env` file in the working directory is loaded into the environment first.

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Directory uploaded photos are written to.
    pub upload_dir: String,
    /// URL prefix the upload directory is served under.
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Loads `.env`, then the layered sources.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var("WILDLOG_CONFIG").unwrap_or_else(|_| "wildlog".to_string());
        Self::from_sources(Some(&file), true)
    }

    /// Built-in defaults plus, optionally, a config file and the environment.
    pub fn from_sources(file: Option<&str>, use_env: bool) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://wildlog.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("media.upload_dir", "static/uploads")?
            .set_default("media.url_prefix", "/static/uploads")?
            .set_default("media.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("log.format", "pretty")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        if use_env {
            builder = builder.add_source(
                Environment::with_prefix("WILDLOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if !self.media.url_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "media.url_prefix must start with '/', got {:?}",
                self.media.url_prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::from_sources(None, false).unwrap();
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.media.url_prefix, "/static/uploads");
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }
}

//! Configuration management for the logistics system

use crate::error::{LogisticsError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Prefix of environment overrides, e.g. `LOGISTICS__PDF_SERVICE__BASE_URL`
pub const ENV_PREFIX: &str = "LOGISTICS";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pdf_service: PdfServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(alias = "bind")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5000,
        }
    }
}

/// HTML to PDF conversion service (Gotenberg-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfServiceConfig {
    #[serde(alias = "url")]
    pub base_url: String,

    pub convert_path: String,

    pub timeout_secs: u64,
}

impl Default for PdfServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            convert_path: "/forms/chromium/convert/html".to_string(),
            timeout_secs: 60,
        }
    }
}

impl LogisticsConfig {
    /// Load configuration from a JSON file, then apply `LOGISTICS__*` environment overrides.
    /// A missing file is not an error: defaults plus environment are used.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
        }

        let config: Self = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| LogisticsError::Config(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LogisticsError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server.bind_address.parse().map_err(|e| {
            LogisticsError::Config(format!(
                "Invalid bind address '{}': {}",
                self.server.bind_address, e
            ))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        if self.database.pool_size == 0 {
            return Err(LogisticsError::Config(
                "Database pool_size must be at least 1".to_string(),
            ));
        }

        if self.pdf_service.base_url.trim().is_empty() {
            return Err(LogisticsError::Config(
                "PDF service base_url is required".to_string(),
            ));
        }

        if !self.pdf_service.convert_path.starts_with('/') {
            return Err(LogisticsError::Config(
                "PDF service convert_path must start with '/'".to_string(),
            ));
        }

        Ok(())
    }
}

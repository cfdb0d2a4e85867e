use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the enrollment desk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrollmentDeskConfig {
    /// Where records live
    pub storage: StorageConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Database settings, used when `storage.backend = "sqlite"`
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory store persisted as a JSON snapshot
    Memory,
    /// SQLite database (requires the `database` feature)
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Snapshot file for the memory backend
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for EnrollmentDeskConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                snapshot_path: PathBuf::from(".enrollment-desk/desk.json"),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            database: Some(DatabaseConfig {
                url: "sqlite://.enrollment-desk/enrollment-desk.db".to_string(),
                max_connections: 5,
                auto_migrate: true,
            }),
        }
    }
}

impl EnrollmentDeskConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (enrollment-desk.toml, .enrollment-desk-rc)
    /// 3. Environment variables (prefixed with ENROLLMENT_DESK__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("enrollment-desk.toml").exists() {
            builder = builder.add_source(File::with_name("enrollment-desk"));
        }

        if Path::new(".enrollment-desk-rc").exists() {
            builder = builder.add_source(
                File::with_name(".enrollment-desk-rc").format(config::FileFormat::Toml),
            );
        }

        // double underscore so field names keep their single underscores
        builder = builder.add_source(
            Environment::with_prefix("ENROLLMENT_DESK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<EnrollmentDeskConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = EnrollmentDeskConfig::load_env_file();
        EnrollmentDeskConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static EnrollmentDeskConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

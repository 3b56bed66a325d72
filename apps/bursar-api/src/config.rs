//! API server configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file
//! (`bursar.toml`, or the path in `BURSAR_CONFIG`), then environment
//! variables prefixed with `BURSAR_`.
//!
//! ```text
//! BURSAR_PORT=8080
//! BURSAR_DATABASE_PATH=/var/lib/bursar/bursar.db
//! BURSAR_MONTHLY_OVERFLOW=discard
//! BURSAR_SMTP__HOST=smtp.gmail.com
//! BURSAR_SMTP__USERNAME=office@example.com
//! ```

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use bursar_core::OverflowPolicy;
use bursar_db::DbConfig;

const DEFAULT_CONFIG_FILE: &str = "bursar.toml";

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to listen on
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Upper bound on pooled connections
    pub db_max_connections: u32,

    /// How long a request may wait for a pooled connection
    pub db_acquire_timeout_secs: u64,

    /// Per-request deadline
    pub request_timeout_secs: u64,

    /// Printed at the top of receipts and signed under reminders
    pub school_name: String,

    /// What happens to Monthly-Fee money beyond twelve months
    pub monthly_overflow: OverflowPolicy,

    /// How many reminder emails are in flight at once
    pub reminder_concurrency: usize,

    /// Outgoing mail; reminders are only logged when absent
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings.
#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

fn default_smtp_port() -> u16 {
    587
}

// The password never reaches the logs.
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "bursar.db".to_string(),
            db_max_connections: 5,
            db_acquire_timeout_secs: 30,
            request_timeout_secs: 30,
            school_name: "Harcharan Singh Memorial Public School".to_string(),
            monthly_overflow: OverflowPolicy::Surface,
            reminder_concurrency: 4,
            smtp: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, the config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("BURSAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let defaults = ApiConfig::default();

        let config: ApiConfig = Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("db_acquire_timeout_secs", defaults.db_acquire_timeout_secs)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("school_name", defaults.school_name)?
            .set_default("monthly_overflow", "surface")?
            .set_default("reminder_concurrency", defaults.reminder_concurrency as u64)?
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("BURSAR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue("bind_addr".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs".to_string()));
        }
        if self.reminder_concurrency == 0 {
            return Err(ConfigError::InvalidValue("reminder_concurrency".to_string()));
        }

        if let Some(smtp) = &self.smtp {
            if smtp.host.trim().is_empty() {
                return Err(ConfigError::MissingSmtpConfig("host"));
            }
            if smtp.from.trim().is_empty() {
                return Err(ConfigError::MissingSmtpConfig("from"));
            }
        }

        Ok(())
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pool settings for the store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("SMTP configured but {0} not provided")]
    MissingSmtpConfig(&'static str),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

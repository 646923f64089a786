use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (stock-monitor)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub fetcher: FetcherConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_seconds: u64,
    pub always_notify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub api_base: String,
    pub request_timeout: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let builder = Self::defaults()?
            // Add default configuration
            .add_source(File::with_name("config/default").required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "STOCK_WATCHER_"
            .add_source(Environment::with_prefix("STOCK_WATCHER").separator("__"))
            // Flat variables from older single-container deployments
            .set_override_option("database.path", env::var("DB_PATH").ok())?
            .set_override_option(
                "scheduler.interval_seconds",
                env::var("CHECK_INTERVAL_SECONDS").ok(),
            )?
            .set_override_option("fetcher.user_agent", env::var("USER_AGENT").ok())?
            .set_override_option(
                "scheduler.always_notify",
                env::var("ALWAYS_NOTIFY")
                    .ok()
                    .map(|v| v.trim().eq_ignore_ascii_case("true")),
            )?;

        Self::from_builder(builder)
    }

    /// Built-in defaults; every other source layers on top of these.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.path", "/data/app.db")?
            .set_default("database.max_connections", 1)?
            .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
            .set_default("fetcher.request_timeout", 25)?
            .set_default("scheduler.interval_seconds", 300)?
            .set_default("scheduler.always_notify", false)?
            .set_default("notifications.telegram.api_base", "https://api.telegram.org")?
            .set_default("notifications.telegram.request_timeout", 15)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Message("Database path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message("Database max_connections must be greater than 0".into()));
        }

        if self.fetcher.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Fetcher user_agent must not be empty".into()));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message("Fetcher request_timeout must be greater than 0".into()));
        }

        if self.scheduler.interval_seconds == 0 {
            return Err(ConfigError::Message("Scheduler interval_seconds must be greater than 0".into()));
        }

        if Url::parse(&self.notifications.telegram.api_base).is_err() {
            return Err(ConfigError::Message("Invalid Telegram api_base URL format".into()));
        }

        if self.notifications.telegram.request_timeout == 0 {
            return Err(ConfigError::Message("Telegram request_timeout must be greater than 0".into()));
        }

        Ok(())
    }
}

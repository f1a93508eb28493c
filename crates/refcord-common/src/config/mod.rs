//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AttributionMode, ConfigError, DatabaseConfig, DiscordConfig,
    Environment, LogFormat, LoggingConfig, RewardsConfig, ServerConfig, ShellConfig,
    REWARDS_ENV_VAR,
};

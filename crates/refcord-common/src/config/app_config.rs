//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding inline reward JSON
pub const REWARDS_ENV_VAR: &str = "REFERRAL_REWARDS_JSON";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
    pub rewards: RewardsConfig,
    pub shell: ShellConfig,
    pub attribution: AttributionMode,
    pub logging: LoggingConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment {other:?}")),
        }
    }
}

/// HTTP ingress bind address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Referral ledger location
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path or `sqlite:` URL
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Platform REST client settings
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

// Keep the bot token out of logs
impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Where reward tiers are read from
///
/// A configured file wins over the inline JSON variable.
#[derive(Debug, Clone, Default)]
pub struct RewardsConfig {
    pub file: Option<PathBuf>,
    pub inline_json: Option<String>,
}

/// Integration shell access and owner settings
#[derive(Clone, Default)]
pub struct ShellConfig {
    /// Bearer token required on `/api/v1`; open when unset
    pub token: Option<String>,
    /// Overrides the platform's application owner for privileged commands
    pub owner_user_id: Option<i64>,
}

impl fmt::Debug for ShellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner_user_id", &self.owner_user_id)
            .finish()
    }
}

/// How concurrent joins in one guild are attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMode {
    /// Handlers interleave freely; first-match, last-writer-wins
    #[default]
    BestEffort,
    /// One resolution in flight per guild
    Serialized,
}

impl FromStr for AttributionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(Self::BestEffort),
            "serialized" => Ok(Self::Serialized),
            other => Err(format!("expected best_effort or serialized, got {other:?}")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other:?}")),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Additional plain-text log file
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_app_name() -> String {
    "refcord".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "referrals.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `DISCORD_TOKEN` is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let env: Environment = vars.parsed("APP_ENV")?.unwrap_or_default();

        Ok(Self {
            app: AppSettings {
                name: vars.string("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: vars.string("API_HOST").unwrap_or_else(default_host),
                port: vars.parsed("API_PORT")?.unwrap_or_else(default_port),
            },
            database: DatabaseConfig {
                url: vars
                    .string("DB_PATH")
                    .or_else(|| vars.string("DATABASE_URL"))
                    .unwrap_or_else(default_database_url),
                max_connections: vars
                    .parsed("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
            },
            discord: DiscordConfig {
                token: vars
                    .string("DISCORD_TOKEN")
                    .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?,
                api_base: vars
                    .string("DISCORD_API_BASE")
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                request_timeout: Duration::from_secs(
                    vars.parsed("DISCORD_REQUEST_TIMEOUT_SECS")?
                        .unwrap_or_else(default_request_timeout_secs),
                ),
            },
            rewards: RewardsConfig {
                file: vars.string("REFERRAL_REWARDS_FILE").map(PathBuf::from),
                inline_json: vars.string(REWARDS_ENV_VAR),
            },
            shell: ShellConfig {
                token: vars.string("SHELL_TOKEN"),
                owner_user_id: vars.parsed("OWNER_USER_ID")?,
            },
            attribution: vars.parsed("ATTRIBUTION_MODE")?.unwrap_or_default(),
            logging: LoggingConfig {
                format: vars.parsed("LOG_FORMAT")?.unwrap_or(if env.is_production() {
                    LogFormat::Json
                } else {
                    LogFormat::Pretty
                }),
                file: vars.string("LOG_FILE").map(PathBuf::from),
            },
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value of a variable
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.string(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ConfigError::InvalidValue(key, format!("{raw:?}: {e}")))
            })
            .transpose()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

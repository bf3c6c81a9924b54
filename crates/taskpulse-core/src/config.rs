use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_DB_PATH: &str = "taskpulse.db";
pub const DEFAULT_CONFIG_PATH: &str = "taskpulse.toml";
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60; // one scheduler cycle per minute
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

/// Top-level config (taskpulse.toml + TASKPULSE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskpulseConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    /// Outbound WhatsApp transport. When absent no notification is ever
    /// attempted and the reminder scheduler is not started.
    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Reminder scheduler cadence and per-send latency bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REMINDER_INTERVAL_SECS,
            send_timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
        }
    }
}

/// Twilio WhatsApp credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub from_number: String,
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
}

impl WhatsAppConfig {
    /// Build credentials from the conventional `TWILIO_*` variables.
    ///
    /// Returns None unless all three are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            account_sid: read("TWILIO_ACCOUNT_SID")?,
            auth_token: read("TWILIO_AUTH_TOKEN")?,
            from_number: read("TWILIO_WHATSAPP_NUMBER")?,
            base_url: default_twilio_base_url(),
        })
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}
fn default_interval_secs() -> u64 {
    DEFAULT_REMINDER_INTERVAL_SECS
}
fn default_send_timeout_secs() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}
fn default_twilio_base_url() -> String {
    DEFAULT_TWILIO_BASE_URL.to_string()
}

impl TaskpulseConfig {
    /// Load config from a TOML file with TASKPULSE_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `TASKPULSE_REMINDERS__INTERVAL_SECS=30`. A missing file is not an
    /// error: every section has defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        Self::figment(path)
            .extract()
            .map_err(|e| crate::error::TaskpulseError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TASKPULSE_").split("__"))
    }
}

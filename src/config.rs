use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sms_contact::{RateLimitConfig, TwilioSettings};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Twilio credentials
    pub twilio: TwilioConfig,
    /// Where notifications go
    pub notify: NotifyConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Per-phone rate limiting
    pub rate_limit: RateLimitConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 5000)
    pub port: u16,
    /// Outbound request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Origin allowed by CORS (default: https://fobfather.ca)
    pub allowed_origin: String,
}

/// Twilio provider configuration. Live delivery needs all three credentials.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: Option<String>,
    /// Twilio Auth Token
    pub auth_token: Option<String>,
    /// Number messages are sent from
    pub phone_number: Option<String>,
    /// API base URL (default: https://api.twilio.com)
    pub base_url: String,
}

/// Notification routing
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// Business owner's number; defaults to the Twilio sender number
    pub owner_phone: Option<String>,
    /// Fallback outbox file (default: outbox.json)
    pub outbox_path: String,
}

/// Security configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes (default: 64KB)
    pub max_body_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            timeout_seconds: 30,
            allowed_origin: "https://fobfather.ca".to_string(),
        }
    }
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            phone_number: None,
            base_url: "https://api.twilio.com".to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            owner_phone: None,
            outbox_path: "outbox.json".to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Plain environment variables the relay has always read.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub twilio_phone: Option<String>,
    pub owner_phone: Option<String>,
    pub outbox_file: Option<String>,
}

impl LegacyEnv {
    /// Read `ACCOUNT_SID`, `AUTH_TOKEN`, `TWILIO_PHONE`, `OWNER_PHONE` and `OUTBOX_FILE`.
    pub fn from_env() -> Self {
        Self {
            account_sid: env::var("ACCOUNT_SID").ok(),
            auth_token: env::var("AUTH_TOKEN").ok(),
            twilio_phone: env::var("TWILIO_PHONE").ok(),
            owner_phone: env::var("OWNER_PHONE").ok(),
            outbox_file: env::var("OUTBOX_FILE").ok(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(LegacyEnv::from_env())
    }

    /// Like [`AppConfig::load`], with the legacy variables supplied by the caller.
    pub fn load_with(legacy: LegacyEnv) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with FOBRELAY_)
            .add_source(Environment::with_prefix("FOBRELAY").separator("__"))
            .set_override_option("twilio.account_sid", legacy.account_sid)?
            .set_override_option("twilio.auth_token", legacy.auth_token)?
            .set_override_option("twilio.phone_number", legacy.twilio_phone)?
            .set_override_option("notify.owner_phone", legacy.owner_phone)?
            .set_override_option("notify.outbox_path", legacy.outbox_file)?
            .build()?;

        s.try_deserialize()
    }

    /// Number that receives contact notifications.
    pub fn owner_phone(&self) -> String {
        self.notify
            .owner_phone
            .clone()
            .or_else(|| self.twilio.phone_number.clone())
            .unwrap_or_default()
    }

    pub fn twilio_settings(&self) -> TwilioSettings {
        TwilioSettings {
            account_sid: self.twilio.account_sid.clone(),
            auth_token: self.twilio.auth_token.clone(),
            phone_number: self.twilio.phone_number.clone(),
            base_url: self.twilio.base_url.clone(),
            timeout: Duration::from_secs(self.server.timeout_seconds),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            twilio: TwilioConfig::default(),
            notify: NotifyConfig::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

//! # fobrelay
//!
//! Relays a website contact form to the business owner's phone as an SMS.
//!
//! `POST /api/contact` accepts `{name?, phone, message?, preferred?, email?}`.
//! Submissions are validated, limited to one per phone every two minutes, and
//! sent through Twilio. Without complete Twilio credentials every message is
//! appended to a local JSON outbox instead.
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use fobrelay::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("Rate limit window: {}s", config.rate_limit.window_seconds);
//! ```
//!
//! Credentials come from `ACCOUNT_SID`, `AUTH_TOKEN` and `TWILIO_PHONE`;
//! everything else can be set in `config/*.toml` or `FOBRELAY_*` variables.

pub mod app;
pub mod config;
pub mod telemetry;

pub use crate::config::*;

/// Common imports for fobrelay usage
pub mod prelude {
    pub use crate::app::{build_processor, build_router};
    pub use crate::config::{
        AppConfig, LegacyEnv, LoggingConfig, NotifyConfig, SecurityConfig, ServerConfig,
        TwilioConfig,
    };
    pub use sms_contact::{
        ContactProcessor, Notifier, Outbox, PhoneRateLimiter, RateLimitConfig, RateLimitResult,
    };
    pub use sms_core::*;
}

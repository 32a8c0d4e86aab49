//! Wiring from [`AppConfig`] to a running router.

use crate::config::AppConfig;
use sms_contact::{ContactProcessor, Notifier, Outbox, PhoneRateLimiter};
use sms_web_axum::{AppState, RouterOptions};
use tracing::{info, warn};

/// Build the contact processor, choosing live or outbox delivery once.
pub fn build_processor(config: &AppConfig) -> ContactProcessor {
    let outbox = Outbox::new(&config.notify.outbox_path);
    let notifier = Notifier::from_settings(&config.twilio_settings(), outbox);

    let owner_phone = config.owner_phone();
    if owner_phone.is_empty() {
        warn!("No owner phone configured, notifications will have an empty recipient");
    }
    info!(
        live = notifier.is_live(),
        window_seconds = config.rate_limit.window_seconds,
        "Contact processor ready"
    );

    ContactProcessor::new(PhoneRateLimiter::new(&config.rate_limit), notifier, owner_phone)
}

/// Build the HTTP router around `processor`.
pub fn build_router(
    config: &AppConfig,
    processor: ContactProcessor,
) -> Result<axum::Router, axum::http::header::InvalidHeaderValue> {
    let options = RouterOptions {
        allowed_origin: config.server.allowed_origin.clone(),
        max_body_size: config.security.max_body_size,
    };
    sms_web_axum::router(AppState { processor }, &options)
}

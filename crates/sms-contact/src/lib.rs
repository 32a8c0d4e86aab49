//! # SMS Contact
//!
//! The contact submission flow, independent of any HTTP framework:
//!
//! - [`validator`] turns a raw JSON body into a [`ContactSubmission`](sms_core::ContactSubmission)
//! - [`rate_limiter`] enforces the per-phone minimum interval
//! - [`notifier`] delivers through a live provider or the [`outbox`]
//! - [`processor`] ties them together into a [`ContactResponse`](sms_core::ContactResponse)

pub mod notifier;
pub mod outbox;
pub mod processor;
pub mod rate_limiter;
pub mod validator;

pub use notifier::{LiveNotifier, Notifier, TwilioSettings};
pub use outbox::Outbox;
pub use processor::{notification_body, ContactProcessor, ResponseConverter, CONFIRMATION_TEXT};
pub use rate_limiter::{PhoneRateLimiter, RateLimitConfig, RateLimitResult};
pub use validator::parse_submission;

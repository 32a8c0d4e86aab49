//! # SMS Core
//!
//! Core traits and types for the fobrelay contact-to-SMS relay.
//!
//! This crate provides the building blocks shared by every other crate:
//! - [`SmsClient`] trait for sending SMS messages through a provider
//! - [`ContactSubmission`] and [`ContactError`] for the contact flow
//! - [`OutboxRecord`] for the durable fallback file
//! - [`ContactResponse`], a framework-agnostic HTTP response
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//!
//! // Any SMS provider implements SmsClient
//! let response = client.send(SendRequest {
//!     to: "+14165550100",
//!     from: "+14165550199",
//!     text: "Hello world!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// Invalid request parameters
    #[error("invalid request: {0}")]
    Invalid(String),
    /// SMS provider returned an error
    #[error("provider error: {0}")]
    Provider(String),
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// Outcomes of a contact submission that are not a success.
///
/// The first three are expected, user-facing rejections with a fixed message.
/// `DeliveryFailed` carries the underlying error text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Invalid JSON")]
    InvalidInput,
    #[error("Valid 10-digit phone required")]
    InvalidPhone,
    #[error("Please wait before sending another message")]
    RateLimited,
    #[error("{0}")]
    DeliveryFailed(String),
}

impl ContactError {
    pub fn status(&self) -> HttpStatus {
        match self {
            ContactError::InvalidInput | ContactError::InvalidPhone => HttpStatus::BadRequest,
            ContactError::RateLimited => HttpStatus::TooManyRequests,
            ContactError::DeliveryFailed(_) => HttpStatus::InternalServerError,
        }
    }
}

impl From<SmsError> for ContactError {
    fn from(e: SmsError) -> Self {
        ContactError::DeliveryFailed(e.to_string())
    }
}

/// HTTP status code for web responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    TooManyRequests = 429,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
    /// Name of the backend/provider that produced the response, e.g. "twilio".
    pub provider: &'static str,
    /// Raw provider payload for debugging / audit.
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Send a single text SMS.
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError>;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    /// Trimmed phone exactly as submitted; also the rate-limit key.
    pub phone: String,
    pub message: String,
    pub preferred: String,
    pub email: String,
}

/// What happened to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// Handed to the provider, which assigned this id.
    Sent { provider_message_id: String },
    /// Written to the outbox instead of being sent.
    Fallback,
}

impl DeliveryResult {
    /// Value reported in the `result` field of a successful response.
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryResult::Sent {
                provider_message_id,
            } => provider_message_id,
            DeliveryResult::Fallback => "fallback",
        }
    }
}

/// One entry of the outbox file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboxRecord {
    pub to: String,
    pub body: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// JSON body of every contact endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Generic response that can be converted to any framework's response type
#[derive(Debug, Clone)]
pub struct ContactResponse {
    pub status: HttpStatus,
    pub body: String,
    pub content_type: String,
}

impl ContactResponse {
    pub fn success(result: &DeliveryResult) -> Self {
        Self::json(
            HttpStatus::Ok,
            &ContactReply {
                message: "Message sent successfully".to_string(),
                result: Some(result.as_str().to_string()),
            },
        )
    }

    pub fn error(error: &ContactError) -> Self {
        let message = match error {
            ContactError::DeliveryFailed(text) => format!("Failed to send message: {}", text),
            other => other.to_string(),
        };
        Self::json(
            error.status(),
            &ContactReply {
                message,
                result: None,
            },
        )
    }

    fn json(status: HttpStatus, reply: &ContactReply) -> Self {
        Self {
            status,
            body: serde_json::to_string(reply).unwrap_or_else(|_| "{}".to_string()),
            content_type: "application/json".to_string(),
        }
    }

    /// Decode the body back into a [`ContactReply`].
    pub fn reply(&self) -> Option<ContactReply> {
        serde_json::from_str(&self.body).ok()
    }
}

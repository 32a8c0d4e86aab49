//! # Twilio SMS Provider
//!
//! Sends SMS through the Twilio Messages REST API.
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_twilio::TwilioClient;
//!
//! let client = TwilioClient::new("AC...", "auth_token")?;
//! let response = client.send(SendRequest {
//!     to: "+14165550100",
//!     from: "+14165550199",
//!     text: "Hello from Twilio!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sms_core::{SendRequest, SendResponse, SmsClient, SmsError};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const PROVIDER: &str = "twilio";
const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio REST client.
#[derive(Clone, Debug)]
pub struct TwilioClient {
    /// Twilio Account SID.
    pub account_sid: String,
    /// Twilio Auth Token (password for Basic auth).
    pub auth_token: String,
    /// API base URL; override for testing/mocking.
    pub base_url: Url,
    http: reqwest::Client,
}

impl TwilioClient {
    pub fn new<S: Into<String>>(account_sid: S, auth_token: S) -> Result<Self, SmsError> {
        Self::with_base_url(account_sid, auth_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url<S: Into<String>>(
        account_sid: S,
        auth_token: S,
        base_url: &str,
    ) -> Result<Self, SmsError> {
        Self::with_options(account_sid, auth_token, base_url, Duration::from_secs(30))
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_options<S: Into<String>>(
        account_sid: S,
        auth_token: S,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, SmsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SmsError::Invalid(format!("base url {}: {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SmsError::Unexpected(e.to_string()))?;
        let account_sid = account_sid.into();
        if account_sid.trim().is_empty() {
            return Err(SmsError::Auth("account sid is empty".into()));
        }

        Ok(Self {
            account_sid,
            auth_token: auth_token.into(),
            base_url,
            http,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.as_str().trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug, Serialize)]
struct TwilioSendRequest<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct TwilioSendResponse {
    sid: Option<String>,
}

/// Message SID from a Messages API payload, or a generated id.
fn message_id(raw: &serde_json::Value) -> String {
    serde_json::from_value::<TwilioSendResponse>(raw.clone())
        .ok()
        .and_then(|r| r.sid)
        .unwrap_or_else(sms_core::fallback_id)
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
        debug!("Sending SMS via Twilio to {}", req.to);
        let payload = TwilioSendRequest {
            to: req.to,
            from: req.from,
            body: req.text,
        };
        let res = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Provider(format!("HTTP {}: {}", status, body)));
        }

        let raw_text = res
            .text()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;
        let raw_json: serde_json::Value = serde_json::from_str(&raw_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw": raw_text }));

        let id = message_id(&raw_json);
        info!(message_id = %id, "Twilio accepted message");

        Ok(SendResponse {
            id,
            provider: PROVIDER,
            raw: raw_json,
        })
    }
}

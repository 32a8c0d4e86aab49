use crate::outbox::Outbox;
use sms_core::{ContactError, DeliveryResult, SendRequest, SmsClient};
use sms_twilio::TwilioClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Credentials for live delivery through Twilio.
#[derive(Debug, Clone, Default)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Number messages are sent from.
    pub phone_number: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl TwilioSettings {
    /// The three credentials, if every one is present and non-blank.
    fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        Some((
            present(&self.account_sid)?,
            present(&self.auth_token)?,
            present(&self.phone_number)?,
        ))
    }
}

/// Sends through a provider from a fixed number.
#[derive(Clone)]
pub struct LiveNotifier {
    client: Arc<dyn SmsClient>,
    from: String,
}

impl LiveNotifier {
    pub fn new(client: Arc<dyn SmsClient>, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }
}

/// How notifications leave the process. Chosen once at startup.
#[derive(Clone)]
pub enum Notifier {
    Live(LiveNotifier),
    Fallback(Outbox),
}

impl Notifier {
    /// Live Twilio delivery when fully configured, the outbox otherwise.
    pub fn from_settings(settings: &TwilioSettings, outbox: Outbox) -> Self {
        let Some((sid, token, from)) = settings.credentials() else {
            warn!(
                outbox = %outbox.path().display(),
                "Twilio credentials incomplete, messages will be written to the outbox"
            );
            return Notifier::Fallback(outbox);
        };

        match TwilioClient::with_options(sid, token, &settings.base_url, settings.timeout) {
            Ok(client) => {
                info!(from = %from, "Live SMS delivery enabled");
                Notifier::Live(LiveNotifier::new(Arc::new(client), from))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    outbox = %outbox.path().display(),
                    "Twilio client unavailable, messages will be written to the outbox"
                );
                Notifier::Fallback(outbox)
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Notifier::Live(_))
    }

    /// Deliver `body` to `to`.
    ///
    /// Provider errors are returned as [`ContactError::DeliveryFailed`] and
    /// are not retried.
    pub async fn deliver(&self, to: &str, body: &str) -> Result<DeliveryResult, ContactError> {
        match self {
            Notifier::Live(live) => {
                let response = live
                    .client
                    .send(SendRequest {
                        to,
                        from: &live.from,
                        text: body,
                    })
                    .await
                    .map_err(|e| {
                        error!(error = %e, "SMS delivery to {} failed", to);
                        ContactError::from(e)
                    })?;
                info!(provider = response.provider, id = %response.id, "SMS sent to {}", to);
                Ok(DeliveryResult::Sent {
                    provider_message_id: response.id,
                })
            }
            Notifier::Fallback(outbox) => {
                outbox.append(to, body).await?;
                Ok(DeliveryResult::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sms_core::{SendResponse, SmsError};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingClient {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl SmsClient for RecordingClient {
        async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
            self.sent
                .lock()
                .unwrap()
                .push((req.to.into(), req.from.into(), req.text.into()));
            Ok(SendResponse {
                id: "SM42".into(),
                provider: "test",
                raw: serde_json::Value::Null,
            })
        }
    }

    struct FailingClient;

    #[async_trait]
    impl SmsClient for FailingClient {
        async fn send(&self, _req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
            Err(SmsError::Provider("HTTP 401: unauthorized".into()))
        }
    }

    fn settings(sid: Option<&str>, token: Option<&str>, phone: Option<&str>) -> TwilioSettings {
        TwilioSettings {
            account_sid: sid.map(String::from),
            auth_token: token.map(String::from),
            phone_number: phone.map(String::from),
            base_url: "https://api.twilio.com".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn any_missing_credential_selects_fallback() {
        let outbox = Outbox::new("unused.json");
        let cases = [
            settings(None, Some("t"), Some("+14165550199")),
            settings(Some("AC1"), None, Some("+14165550199")),
            settings(Some("AC1"), Some("t"), None),
            settings(Some("AC1"), Some(""), Some("+14165550199")),
        ];
        for case in cases {
            assert!(!Notifier::from_settings(&case, outbox.clone()).is_live());
        }
    }

    #[test]
    fn full_credentials_select_live() {
        let notifier = Notifier::from_settings(
            &settings(Some("AC1"), Some("t"), Some("+14165550199")),
            Outbox::new("unused.json"),
        );
        assert!(notifier.is_live());
    }

    #[test]
    fn unusable_client_selects_fallback() {
        let mut bad = settings(Some("AC1"), Some("t"), Some("+14165550199"));
        bad.base_url = "::not a url::".into();
        assert!(!Notifier::from_settings(&bad, Outbox::new("unused.json")).is_live());
    }

    #[tokio::test]
    async fn live_sends_from_configured_number() {
        let client = Arc::new(RecordingClient::default());
        let notifier = Notifier::Live(LiveNotifier::new(client.clone(), "+14165550199"));

        let result = notifier.deliver("+14165550100", "hello").await.unwrap();
        assert_eq!(
            result,
            DeliveryResult::Sent {
                provider_message_id: "SM42".into()
            }
        );
        let sent = client.sent.lock().unwrap();
        assert_eq!(
            sent[0],
            ("+14165550100".into(), "+14165550199".into(), "hello".into())
        );
    }

    #[tokio::test]
    async fn live_failure_propagates() {
        let notifier = Notifier::Live(LiveNotifier::new(Arc::new(FailingClient), "+14165550199"));
        let err = notifier.deliver("+14165550100", "hello").await.unwrap_err();
        assert_eq!(
            err,
            ContactError::DeliveryFailed("provider error: HTTP 401: unauthorized".into())
        );
    }

    #[tokio::test]
    async fn fallback_appends_to_outbox() {
        let dir = TempDir::new().unwrap();
        let outbox = Outbox::new(dir.path().join("outbox.json"));
        let notifier = Notifier::Fallback(outbox.clone());

        let result = notifier.deliver("+14165550199", "hello").await.unwrap();
        assert_eq!(result, DeliveryResult::Fallback);

        let records = outbox.load().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to, "+14165550199");
        assert_eq!(records[0].body, "hello");
    }
}

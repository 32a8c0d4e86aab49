use crate::notifier::Notifier;
use crate::rate_limiter::{PhoneRateLimiter, RateLimitResult};
use crate::validator::parse_submission;
use sms_core::{ContactError, ContactResponse, ContactSubmission, DeliveryResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sent to the submitter after a live notification went out.
pub const CONFIRMATION_TEXT: &str = "Thanks — we received your message. We’ll contact you within business hours to confirm. — FobFather";

const MESSAGE_PREVIEW_CHARS: usize = 80;

/// Text of the notification sent to the business owner.
pub fn notification_body(submission: &ContactSubmission) -> String {
    let preview: String = submission
        .message
        .chars()
        .take(MESSAGE_PREVIEW_CHARS)
        .collect();
    format!(
        "FobFather Contact\nName: {}\nPhone: {}\nMsg: {}\nPreferred: {}",
        submission.name, submission.phone, preview, submission.preferred
    )
}

/// Framework-agnostic processor for contact submissions
#[derive(Clone)]
pub struct ContactProcessor {
    limiter: PhoneRateLimiter,
    notifier: Arc<Notifier>,
    owner_phone: String,
}

impl ContactProcessor {
    pub fn new(limiter: PhoneRateLimiter, notifier: Notifier, owner_phone: impl Into<String>) -> Self {
        Self {
            limiter,
            notifier: Arc::new(notifier),
            owner_phone: owner_phone.into(),
        }
    }

    pub fn limiter(&self) -> &PhoneRateLimiter {
        &self.limiter
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Process a raw request body and return a framework-agnostic response
    pub async fn process_contact(&self, body: &[u8]) -> ContactResponse {
        match self.process_contact_internal(body).await {
            Ok(result) => ContactResponse::success(&result),
            Err(e) => {
                if let ContactError::DeliveryFailed(_) = e {
                    warn!(error = %e, "Contact submission could not be delivered");
                } else {
                    debug!(error = %e, "Contact submission rejected");
                }
                ContactResponse::error(&e)
            }
        }
    }

    async fn process_contact_internal(&self, body: &[u8]) -> Result<DeliveryResult, ContactError> {
        let submission = parse_submission(body)?;

        if let RateLimitResult::Limited { .. } = self.limiter.check_and_record(&submission.phone).await {
            return Err(ContactError::RateLimited);
        }

        let notification = notification_body(&submission);
        let result = self.notifier.deliver(&self.owner_phone, &notification).await?;
        info!(result = result.as_str(), "Contact from {} relayed", submission.phone);

        if self.notifier.is_live() && !submission.phone.is_empty() {
            self.spawn_confirmation(submission.phone);
        }

        Ok(result)
    }

    /// Best-effort confirmation to the submitter. Its outcome never reaches
    /// the response.
    fn spawn_confirmation(&self, phone: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.deliver(&phone, CONFIRMATION_TEXT).await {
                Ok(result) => debug!(result = result.as_str(), "Confirmation sent to {}", phone),
                Err(e) => warn!(error = %e, "Confirmation to {} failed", phone),
            }
        });
    }
}

/// Helper trait for framework adapters to convert responses
pub trait ResponseConverter {
    type ResponseType;

    fn from_contact_response(response: ContactResponse) -> Self::ResponseType;
}

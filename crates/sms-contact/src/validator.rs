use serde_json::{Map, Value};
use sms_core::{ContactError, ContactSubmission};

const DEFAULT_NAME: &str = "Anonymous";
const PHONE_DIGITS: usize = 10;

/// Parse and validate a raw contact request body.
///
/// The body must be a non-empty JSON object. Every field is optional at this
/// level; missing or `null` fields read as empty strings and everything is
/// trimmed. The phone must contain exactly ten ASCII digits once other
/// characters are ignored, but the trimmed original is what gets returned.
pub fn parse_submission(body: &[u8]) -> Result<ContactSubmission, ContactError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ContactError::InvalidInput)?;
    let fields = match value {
        Value::Object(fields) if !fields.is_empty() => fields,
        _ => return Err(ContactError::InvalidInput),
    };

    let name = text_field(&fields, "name")?;
    let phone = text_field(&fields, "phone")?;
    let message = text_field(&fields, "message")?;
    let preferred = text_field(&fields, "preferred")?;
    let email = text_field(&fields, "email")?;

    if digit_count(&phone) != PHONE_DIGITS {
        return Err(ContactError::InvalidPhone);
    }

    Ok(ContactSubmission {
        name: if name.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            name
        },
        phone,
        message,
        preferred,
        email,
    })
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Result<String, ContactError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(ContactError::InvalidInput),
    }
}

fn digit_count(phone: &str) -> usize {
    phone.chars().filter(char::is_ascii_digit).count()
}

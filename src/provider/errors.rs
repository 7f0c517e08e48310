//! Mapping of non-success HTTP responses to user-facing messages.

use crate::Error;
use serde_json::Value;

/// Pull the most specific message out of an error body:
/// `error.message`, then `message`, then the status text.
pub fn extract_message(body: &str, status_text: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let message = parsed
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .or_else(|| parsed.get("message").and_then(|m| m.as_str()))
        .unwrap_or(status_text);
    Some(message.to_string())
}

/// Build the error for a non-2xx, non-429 response.
pub fn remote_error(status: u16, status_text: &str, body: &str, url: &str) -> Error {
    let message = match extract_message(body, status_text) {
        Some(msg) => match status {
            422 => format!(
                "Unprocessable Entity: {}. Please check the message format and ensure all required fields are present.",
                msg
            ),
            400 => format!("Bad Request: {}. Please verify the request parameters.", msg),
            401 => format!("Unauthorized: {}. Please check your API key.", msg),
            403 => format!(
                "Forbidden: {}. You don't have permission to access this resource.",
                msg
            ),
            _ => msg,
        },
        None => format!("{} (Status: {}, URL: {})", status_text, status, url),
    };
    Error::Remote { status, message }
}

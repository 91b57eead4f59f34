//! HTTP status classification shared by the remote clients.

use std::error::Error as _;

use http::StatusCode;
use serde::Deserialize;

use crate::error::ClientError;

/// Longest slice of a non-OData error body carried into an error message.
const MAX_BODY_IN_MESSAGE: usize = 256;

/// Maps an HTTP status to the client error taxonomy.
///
/// | Status | Result |
/// |---|---|
/// | 2xx, 3xx | `Ok` |
/// | 401, 403 | `Auth` |
/// | 408, 429, 5xx | `Transport` |
/// | other 4xx | `Validation` |
///
/// # Errors
///
/// Returns the classified `ClientError` for every non-success status.
pub fn classify_status(status: StatusCode, body: &[u8]) -> Result<(), ClientError> {
    if status.is_success() || status.is_redirection() || status.is_informational() {
        return Ok(());
    }
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Auth { status: code }),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            Err(ClientError::Transport {
                message: format!("HTTP {code}: {}", error_message(body)),
            })
        }
        s if s.is_client_error() => Err(ClientError::Validation {
            status: code,
            message: error_message(body),
        }),
        _ => Err(ClientError::Transport {
            message: format!("HTTP {code}: {}", error_message(body)),
        }),
    }
}

/// Converts a `reqwest` failure (connect, timeout, body read) into a
/// transport error, keeping the cause chain.
#[must_use]
pub fn transport_error(err: &reqwest::Error) -> ClientError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    ClientError::Transport { message }
}

#[derive(Deserialize)]
struct ODataErrorBody {
    error: ODataError,
}

#[derive(Deserialize)]
struct ODataError {
    #[serde(default)]
    code: String,
    message: ODataMessage,
}

#[derive(Deserialize)]
struct ODataMessage {
    value: String,
}

/// Extracts a human-readable message from an error body.
///
/// Prefers the OData `error.message.value` (prefixed with `error.code` when
/// present); otherwise falls back to a truncated copy of the raw body.
#[must_use]
pub fn error_message(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ODataErrorBody>(body) {
        let ODataError { code, message } = parsed.error;
        return if code.is_empty() {
            message.value
        } else {
            format!("{code}: {}", message.value)
        };
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "empty response body".to_string();
    }
    match text.char_indices().nth(MAX_BODY_IN_MESSAGE) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

//! Error taxonomy for the request pipeline
//!
//! Every terminal state of the pipeline maps to exactly one kind here;
//! nothing is swallowed. The taxonomy is closed on purpose: callers match
//! on it to decide between "re-authenticate", "restart login", "retry at
//! your discretion", and "show the server's message".
//!
//! Message extraction from error bodies is data-driven: an ordered list of
//! extractors tried top to bottom, first match wins. A new server error
//! shape is one new entry in [`MESSAGE_RULES`], not another branch in the
//! pipeline.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::Value;

/// Failure kinds surfaced by [`ApiClient`](crate::ApiClient).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server rejected the request's credential, or the request
    /// carried none and the endpoint requires one. The caller should
    /// prompt for re-authentication.
    #[error("unauthorized")]
    Unauthorized,

    /// The refresh protocol itself failed. The local credential is gone
    /// and the caller must restart the login flow.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// No response within the configured window. Credential state is
    /// untouched; the caller may retry the whole operation, the client
    /// never retries timeouts on its own.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Any other non-success response, with the message extracted from
    /// the error body. Fully recoverable by the caller.
    #[error("request failed ({status}): {message}")]
    RequestFailed {
        status: u16,
        message: String,
        /// Per-field validation errors, when the server provided them
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    /// Connection-level failure before any HTTP semantics applied.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Ordered error-body message extractors, first match wins.
///
/// Shapes, in precedence order:
/// 1. `{"detail": "..."}`
/// 2. `{"detail": [{"msg": "..."}, ...]}` (validation errors, first item)
/// 3. `{"message": "..."}`
/// 4. `{"data": {"message": "..."}}`
const MESSAGE_RULES: &[fn(&Value) -> Option<String>] = &[
    |body| body.get("detail")?.as_str().map(str::to_owned),
    |body| {
        let first = body.get("detail")?.as_array()?.first()?;
        first.get("msg")?.as_str().map(str::to_owned)
    },
    |body| body.get("message")?.as_str().map(str::to_owned),
    |body| body.get("data")?.get("message")?.as_str().map(str::to_owned),
];

/// Extract a human-readable message from an error body.
///
/// Falls back to the status line's canonical reason when the body is not
/// JSON or matches no known shape.
pub(crate) fn extract_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<Value>(body) {
        for rule in MESSAGE_RULES {
            if let Some(message) = rule(&json) {
                return message;
            }
        }
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_owned()
}

/// Per-field validation errors from an `{"errors": {field: [msg, ...]}}`
/// body, when present.
fn extract_field_errors(body: &[u8]) -> Option<HashMap<String, Vec<String>>> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let map = json.get("errors")?.as_object()?;
    let mut fields = HashMap::new();
    for (name, messages) in map {
        let messages = messages
            .as_array()?
            .iter()
            .filter_map(|m| m.as_str().map(str::to_owned))
            .collect();
        fields.insert(name.clone(), messages);
    }
    Some(fields)
}

/// Classify a non-401 error response into [`Error::RequestFailed`].
pub(crate) fn classify_response(status: StatusCode, body: &[u8]) -> Error {
    Error::RequestFailed {
        status: status.as_u16(),
        message: extract_message(status, body),
        field_errors: extract_field_errors(body),
    }
}

//! Response envelope normalization
//!
//! The marketplace API wraps most payloads in `{ success, data, message }`.
//! These helpers unwrap successful envelopes, classify error responses, and
//! fold field-level validation errors into one readable message.

use crate::error::{ClientError, Result};
use serde::Serialize;
use serde_json::Value;

/// Caller-facing error shape: one message, the structured details when the
/// server sent any, the HTTP status when there was a response, and `success`
/// pinned to `false`.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub success: bool,
}

impl NormalizedError {
    pub(crate) fn new(message: String, details: Option<Value>, status: Option<u16>) -> Self {
        Self {
            message,
            details,
            status,
            success: false,
        }
    }
}

/// Unwrap a success-status response body.
///
/// A body without an explicit boolean `success` field is implicitly
/// successful and passes through unmodified. `success: true` yields the
/// `data` payload; `success: false` is an application-level rejection even
/// though the transport reported 2xx.
pub fn normalize_success(body: Value) -> Result<Value> {
    let Some(success) = body.get("success").and_then(Value::as_bool) else {
        return Ok(body);
    };

    if success {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request rejected by server")
        .to_string();
    Err(ClientError::Rejected { message })
}

/// Derive the message and structured details for an error-status response.
///
/// Prefers the server's own `message`, falling back to a plain-text body and
/// then to a human message for the status code. For validation failures the
/// field-level details are appended to the message.
pub fn error_from_response(status: u16, body: &Value) -> (String, Option<Value>) {
    let details = body
        .get("details")
        .or_else(|| body.get("errors"))
        .cloned()
        .filter(|d| !d.is_null());

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| body.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status_message(status).to_string());

    if status == 422 {
        if let Some(summary) = details.as_ref().and_then(aggregate_validation) {
            return (format!("{message}: {summary}"), details);
        }
    }

    (message, details)
}

/// Fold validation details into `"field: message; field: message"`.
///
/// Servers send three shapes: an array of field-error records, an object
/// keyed by field name, or a plain string.
fn aggregate_validation(details: &Value) -> Option<String> {
    match details {
        Value::Array(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .filter_map(|entry| {
                    let field = entry
                        .get("path")
                        .or_else(|| entry.get("param"))
                        .or_else(|| entry.get("field"))
                        .and_then(Value::as_str);
                    let message = entry
                        .get("msg")
                        .or_else(|| entry.get("message"))
                        .and_then(Value::as_str);
                    match (field, message) {
                        (Some(f), Some(m)) => Some(format!("{f}: {m}")),
                        (None, Some(m)) => Some(m.to_string()),
                        (Some(f), None) => Some(f.to_string()),
                        (None, None) => entry.as_str().map(str::to_string),
                    }
                })
                .collect();
            (!rendered.is_empty()).then(|| rendered.join("; "))
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .filter_map(|(field, value)| value.as_str().map(|m| format!("{field}: {m}")))
                .collect();
            (!rendered.is_empty()).then(|| rendered.join("; "))
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Authentication required",
        403 => "You do not have permission to perform this action",
        404 => "Resource not found",
        409 => "Conflict with the current state of the resource",
        422 => "Validation failed",
        429 => "Too many requests, please slow down",
        500 => "Internal server error",
        502 | 503 | 504 => "Service temporarily unavailable",
        _ => "Request failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_without_envelope_passes_through() {
        let body = json!({ "id": 1, "name": "x" });
        assert_eq!(normalize_success(body.clone()).unwrap(), body);
    }

    #[test]
    fn success_envelope_unwraps_data() {
        let body = json!({ "success": true, "data": { "id": 7 }, "message": "ok" });
        assert_eq!(normalize_success(body).unwrap(), json!({ "id": 7 }));
    }

    #[test]
    fn success_envelope_without_data_yields_null() {
        let body = json!({ "success": true, "message": "deleted" });
        assert_eq!(normalize_success(body).unwrap(), Value::Null);
    }

    #[test]
    fn explicit_failure_envelope_is_rejected() {
        let err = normalize_success(json!({ "success": false, "message": "out of stock" }))
            .unwrap_err();
        match err {
            ClientError::Rejected { message } => assert_eq!(message, "out of stock"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_boolean_success_field_is_not_an_envelope() {
        let body = json!({ "success": "yes", "data": 1 });
        assert_eq!(normalize_success(body.clone()).unwrap(), body);
    }

    #[test]
    fn validation_errors_aggregate_from_array() {
        let body = json!({
            "message": "Validation failed",
            "details": [{ "path": "email", "msg": "invalid email" }],
        });
        let (message, details) = error_from_response(422, &body);
        assert_eq!(message, "Validation failed: email: invalid email");
        assert_eq!(
            details,
            Some(json!([{ "path": "email", "msg": "invalid email" }]))
        );
    }

    #[test]
    fn validation_errors_aggregate_from_map() {
        let body = json!({
            "message": "Validation failed",
            "errors": { "password": "too short", "email": "invalid email" },
        });
        let (message, _) = error_from_response(422, &body);
        assert_eq!(
            message,
            "Validation failed: email: invalid email; password: too short"
        );
    }

    #[test]
    fn validation_errors_accept_plain_string() {
        let body = json!({ "message": "Validation failed", "details": "email is required" });
        let (message, _) = error_from_response(422, &body);
        assert_eq!(message, "Validation failed: email is required");
    }

    #[test]
    fn plain_text_error_body_becomes_the_message() {
        let body = Value::String("Unauthorized".to_string());
        let (message, details) = error_from_response(401, &body);
        assert_eq!(message, "Unauthorized");
        assert!(details.is_none());
    }

    #[test]
    fn missing_message_falls_back_to_status_text() {
        let (message, _) = error_from_response(404, &Value::Null);
        assert_eq!(message, "Resource not found");

        let (message, _) = error_from_response(418, &Value::Null);
        assert_eq!(message, "Request failed");
    }

    #[test]
    fn normalized_error_serializes_with_success_false() {
        let normalized = NormalizedError::new("boom".to_string(), None, Some(500));
        let value = serde_json::to_value(&normalized).unwrap();
        assert_eq!(
            value,
            json!({ "message": "boom", "status": 500, "success": false })
        );
    }
}

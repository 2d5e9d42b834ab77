//! Response decoding.
//!
//! The expected payload shape belongs to the endpoint, so each shape has its own entry point:
//!
//! | Function | Success payload | Non-200 status |
//! |----------|-----------------|----------------|
//! | [`decode_object`] | JSON object | `Err(Status)` |
//! | [`decode_array`] | JSON array | `Err(Status)` |
//! | [`decode_typed`] | `T: Deserialize` from an object | `Err(Status)` |
//! | [`decode_bytes`] | raw bytes, `Content-Length` sized | `Ok(Rejected)` |
//!
//! A JSON body carrying an `error` field is a server-side application error. It is logged and
//! returned as [`Outcome::Rejected`], never substituted by a default value. A body that is not
//! valid JSON is a decode failure.

use crate::error::{reason_phrase, QuipError, Result};
use crate::types::{ErrorEnvelope, Outcome, QuipResponse};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn log_envelope(envelope: &ErrorEnvelope, status: u16) {
    tracing::warn!(
        status,
        error_code = %envelope.error_code,
        error = %envelope.error,
        error_description = %envelope.error_description,
        "Server returned error envelope: {}",
        envelope
    );
}

/// Best-effort envelope extraction from a body that may not be JSON at all.
fn sniff_envelope(response: &QuipResponse) -> Option<ErrorEnvelope> {
    serde_json::from_slice::<Value>(&response.body)
        .ok()
        .as_ref()
        .and_then(ErrorEnvelope::detect)
}

/// Fail with a status error unless the response is a 200.
pub fn ensure_ok(response: &QuipResponse) -> Result<()> {
    if response.is_ok() {
        return Ok(());
    }
    let envelope = sniff_envelope(response);
    if let Some(env) = &envelope {
        log_envelope(env, response.status);
    }
    Err(QuipError::from_status(response.status, envelope))
}

/// Decode a JSON object body.
///
/// # Examples
///
/// ```
/// use quip_client::client::decode_object;
/// use quip_client::types::{Outcome, QuipResponse};
///
/// let ok = QuipResponse::new(200, r#"{"thread":{"id":"T"}}"#);
/// assert!(matches!(decode_object(&ok).unwrap(), Outcome::Value(_)));
///
/// let rejected = QuipResponse::new(200, r#"{"error":"Bad Request","error_code":400}"#);
/// assert!(decode_object(&rejected).unwrap().is_rejected());
///
/// let failed = QuipResponse::new(404, r#"{"error":"Not Found"}"#);
/// assert_eq!(decode_object(&failed).unwrap_err().status(), Some(404));
/// ```
pub fn decode_object(response: &QuipResponse) -> Result<Outcome<Value>> {
    ensure_ok(response)?;
    let map: serde_json::Map<String, Value> = serde_json::from_slice(&response.body)?;
    let value = Value::Object(map);
    if let Some(envelope) = ErrorEnvelope::detect(&value) {
        log_envelope(&envelope, response.status);
        return Ok(Outcome::Rejected(envelope));
    }
    Ok(Outcome::Value(value))
}

/// Decode a JSON object body into `T`.
pub fn decode_typed<T: DeserializeOwned>(response: &QuipResponse) -> Result<Outcome<T>> {
    match decode_object(response)? {
        Outcome::Value(value) => Ok(Outcome::Value(serde_json::from_value(value)?)),
        Outcome::Rejected(env) => Ok(Outcome::Rejected(env)),
    }
}

/// Decode a JSON array body.
///
/// An object in place of the array is accepted only when it is an error envelope.
pub fn decode_array(response: &QuipResponse) -> Result<Outcome<Vec<Value>>> {
    ensure_ok(response)?;
    match serde_json::from_slice::<Value>(&response.body)? {
        Value::Array(items) => Ok(Outcome::Value(items)),
        other => match ErrorEnvelope::detect(&other) {
            Some(envelope) => {
                log_envelope(&envelope, response.status);
                Ok(Outcome::Rejected(envelope))
            }
            None => Err(QuipError::BodyParse(format!(
                "expected JSON array, got {}",
                json_kind(&other)
            ))),
        },
    }
}

/// Decode a binary body (exports, blobs).
///
/// On 200 the bytes are returned sized to the declared `Content-Length`; a body shorter than
/// declared is a decode failure. On any other status the body is read as an error envelope,
/// logged, and returned as `Rejected`; when the body holds no envelope one is synthesized from
/// the status line.
pub fn decode_bytes(response: &QuipResponse) -> Result<Outcome<Bytes>> {
    if !response.is_ok() {
        let envelope = sniff_envelope(response).unwrap_or_else(|| ErrorEnvelope {
            error: reason_phrase(response.status).to_string(),
            error_code: response.status.to_string(),
            error_description: String::new(),
        });
        log_envelope(&envelope, response.status);
        return Ok(Outcome::Rejected(envelope));
    }

    let body = response.body.clone();
    match response.content_length() {
        Some(declared) if body.len() < declared => Err(QuipError::BodyParse(format!(
            "body truncated: declared {} bytes, received {}",
            declared,
            body.len()
        ))),
        Some(declared) => Ok(Outcome::Value(body.slice(..declared))),
        None => Ok(Outcome::Value(body)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_object_value() {
        let response = QuipResponse::new(200, r#"{"user_id":"U","url":"wss://x"}"#);
        let value = decode_object(&response).unwrap().into_value().unwrap();
        assert_eq!(value["user_id"], "U");
    }

    #[test]
    fn test_object_envelope_on_200() {
        let response = QuipResponse::new(
            200,
            r#"{"error":"Bad Request","error_code":400,"error_description":"missing thread_id"}"#,
        );
        let outcome = decode_object(&response).unwrap();
        let env = outcome.envelope().unwrap();
        assert_eq!(env.error, "Bad Request");
        assert_eq!(env.error_code, "400");
        assert_eq!(env.error_description, "missing thread_id");
    }

    #[test]
    fn test_object_malformed_is_error() {
        let response = QuipResponse::new(200, "<html>oops</html>");
        assert!(matches!(
            decode_object(&response),
            Err(QuipError::Json(_))
        ));
    }

    #[test]
    fn test_object_rejects_array_body() {
        let response = QuipResponse::new(200, "[]");
        assert!(matches!(decode_object(&response), Err(QuipError::Json(_))));
    }

    #[test]
    fn test_status_error_keeps_envelope() {
        let response = QuipResponse::new(403, r#"{"error":"Forbidden","error_code":"403"}"#);
        match decode_object(&response) {
            Err(QuipError::Status {
                status, envelope, ..
            }) => {
                assert_eq!(status, 403);
                assert_eq!(envelope.unwrap().error, "Forbidden");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_error_without_json_body() {
        let response = QuipResponse::new(500, "boom");
        match decode_object(&response) {
            Err(QuipError::Status {
                status,
                reason,
                envelope,
            }) => {
                assert_eq!(status, 500);
                assert_eq!(reason, "Internal Server Error");
                assert!(envelope.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_array_value_and_envelope() {
        let response = QuipResponse::new(200, r#"[{"thread":{"id":"a"}},{"thread":{"id":"b"}}]"#);
        assert_eq!(decode_array(&response).unwrap().into_value().unwrap().len(), 2);

        let response = QuipResponse::new(200, r#"{"error":"Unauthorized"}"#);
        assert!(decode_array(&response).unwrap().is_rejected());

        let response = QuipResponse::new(200, r#"{"threads":[]}"#);
        assert!(matches!(
            decode_array(&response),
            Err(QuipError::BodyParse(_))
        ));
    }

    #[test]
    fn test_typed() {
        #[derive(Deserialize)]
        struct Token {
            access_token: String,
        }
        let response = QuipResponse::new(200, r#"{"access_token":"abc"}"#);
        let token: Token = decode_typed(&response).unwrap().into_value().unwrap();
        assert_eq!(token.access_token, "abc");
    }

    #[test]
    fn test_bytes_sized_to_content_length() {
        let response =
            QuipResponse::new(200, &b"PK\x03\x04extra"[..]).with_header("Content-Length", "4");
        let bytes = decode_bytes(&response).unwrap().into_value().unwrap();
        assert_eq!(&bytes[..], b"PK\x03\x04");
    }

    #[test]
    fn test_bytes_truncated_body() {
        let response = QuipResponse::new(200, "abc").with_header("Content-Length", "10");
        assert!(matches!(
            decode_bytes(&response),
            Err(QuipError::BodyParse(_))
        ));
    }

    #[test]
    fn test_bytes_non_200_is_rejected_not_error() {
        let response = QuipResponse::new(404, r#"{"error":"Not Found","error_code":"404"}"#);
        let outcome = decode_bytes(&response).unwrap();
        assert_eq!(outcome.envelope().unwrap().error, "Not Found");

        let response = QuipResponse::new(502, "gateway");
        let outcome = decode_bytes(&response).unwrap();
        let env = outcome.envelope().unwrap();
        assert_eq!(env.error_code, "502");
        assert_eq!(env.error, "Bad Gateway");
    }
}

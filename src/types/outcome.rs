//! Decoded results and the server error envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error object embedded in an otherwise well-formed JSON response.
///
/// Absent fields read as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short error name (`"error"` field)
    pub error: String,
    /// Numeric or symbolic code (`"error_code"` field)
    pub error_code: String,
    /// Human readable description (`"error_description"` field)
    pub error_description: String,
}

impl ErrorEnvelope {
    /// Detect an envelope in a decoded JSON value.
    ///
    /// Only objects carrying an `error` key are envelopes. Non-string field values are kept
    /// in their JSON text form.
    ///
    /// ```
    /// use quip_client::types::ErrorEnvelope;
    /// use serde_json::json;
    ///
    /// let env = ErrorEnvelope::detect(&json!({"error": "Not Found", "error_code": 404})).unwrap();
    /// assert_eq!(env.error_code, "404");
    /// assert_eq!(env.error_description, "");
    /// assert!(ErrorEnvelope::detect(&json!({"thread": {}})).is_none());
    /// ```
    pub fn detect(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let error = object.get("error")?;
        let field = |v: Option<&Value>| match v {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Some(ErrorEnvelope {
            error: field(Some(error)),
            error_code: field(object.get("error_code")),
            error_description: field(object.get("error_description")),
        })
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.error_code, self.error, self.error_description
        )
    }
}

/// Result of a decoded read that reached the server successfully.
///
/// `Rejected` means the server answered with an error envelope; it is distinct from a
/// transport failure, which is reported as `Err(QuipError::Status { .. })`.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The decoded payload
    Value(T),
    /// The server reported an application error
    Rejected(ErrorEnvelope),
}

impl<T> Outcome<T> {
    /// Borrow the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Rejected(_) => None,
        }
    }

    /// Take the value, discarding a rejection.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Rejected(_) => None,
        }
    }

    /// The envelope of a rejected outcome.
    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Rejected(env) => Some(env),
        }
    }

    /// True for a server-reported application error.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Map the carried value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Value(v) => Outcome::Value(f(v)),
            Outcome::Rejected(env) => Outcome::Rejected(env),
        }
    }
}

//! Thin typed views over decoded JSON entities.
//!
//! These wrap the server's JSON untouched and expose only the fields the pipeline, the live
//! session and the section model rely on. `json()` gives access to everything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
}

fn i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_i64)
}

/// Kind of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadType {
    /// Text document
    Document,
    /// Spreadsheet
    Spreadsheet,
    /// Chat room
    Chat,
    /// Slide deck
    Slides,
}

impl ThreadType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadType::Document => "document",
            ThreadType::Spreadsheet => "spreadsheet",
            ThreadType::Chat => "chat",
            ThreadType::Slides => "slides",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(ThreadType::Document),
            "spreadsheet" => Some(ThreadType::Spreadsheet),
            "chat" => Some(ThreadType::Chat),
            "slides" => Some(ThreadType::Slides),
            _ => None,
        }
    }
}

/// A document or chat thread, including its HTML snapshot when the server sent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thread {
    json: Value,
}

impl Thread {
    /// Wrap a decoded thread payload.
    pub fn new(json: Value) -> Self {
        Thread { json }
    }

    /// Thread id.
    pub fn id(&self) -> Option<&str> {
        str_at(&self.json, &["thread", "id"])
    }

    /// Thread title.
    pub fn title(&self) -> Option<&str> {
        str_at(&self.json, &["thread", "title"])
    }

    /// Browser URL of the thread.
    pub fn link(&self) -> Option<&str> {
        str_at(&self.json, &["thread", "link"])
    }

    /// Kind of thread, when recognized.
    pub fn thread_type(&self) -> Option<ThreadType> {
        str_at(&self.json, &["thread", "type"]).and_then(ThreadType::parse)
    }

    /// Id of the creator.
    pub fn author_id(&self) -> Option<&str> {
        str_at(&self.json, &["thread", "author_id"])
    }

    /// Last update time in microseconds since the epoch.
    pub fn updated_usec(&self) -> Option<i64> {
        i64_at(&self.json, &["thread", "updated_usec"])
    }

    /// Document HTML snapshot (top-level `html` field).
    pub fn html(&self) -> Option<&str> {
        str_at(&self.json, &["html"])
    }

    /// Raw JSON payload.
    pub fn json(&self) -> &Value {
        &self.json
    }
}

/// A chat message or comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    json: Value,
}

impl Message {
    /// Wrap a decoded message payload.
    pub fn new(json: Value) -> Self {
        Message { json }
    }

    /// Message id.
    pub fn id(&self) -> Option<&str> {
        str_at(&self.json, &["id"])
    }

    /// Id of the sender.
    pub fn author_id(&self) -> Option<&str> {
        str_at(&self.json, &["author_id"])
    }

    /// Display name of the sender.
    pub fn author_name(&self) -> Option<&str> {
        str_at(&self.json, &["author_name"])
    }

    /// Plain-text body.
    pub fn text(&self) -> Option<&str> {
        str_at(&self.json, &["text"])
    }

    /// Creation time, microseconds since the epoch.
    pub fn created_usec(&self) -> Option<i64> {
        i64_at(&self.json, &["created_usec"])
    }

    /// Raw JSON payload.
    pub fn json(&self) -> &Value {
        &self.json
    }
}

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User {
    json: Value,
}

impl User {
    /// Wrap a decoded user payload.
    pub fn new(json: Value) -> Self {
        User { json }
    }

    /// User id.
    pub fn id(&self) -> Option<&str> {
        str_at(&self.json, &["id"])
    }

    /// Display name.
    pub fn name(&self) -> Option<&str> {
        str_at(&self.json, &["name"])
    }

    /// Registered email addresses.
    pub fn emails(&self) -> Vec<&str> {
        self.json
            .get("emails")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Raw JSON payload.
    pub fn json(&self) -> &Value {
        &self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_thread_fields() {
        let thread = Thread::new(json!({
            "thread": {"id": "T1", "title": "Plan", "type": "spreadsheet", "updated_usec": 1620000000000000_i64},
            "html": "<table id='t'></table>"
        }));
        assert_eq!(thread.id(), Some("T1"));
        assert_eq!(thread.title(), Some("Plan"));
        assert_eq!(thread.thread_type(), Some(ThreadType::Spreadsheet));
        assert_eq!(thread.updated_usec(), Some(1620000000000000));
        assert_eq!(thread.html(), Some("<table id='t'></table>"));
        assert_eq!(thread.link(), None);
    }

    #[test]
    fn test_message_and_user() {
        let message = Message::new(json!({"id": "M", "text": "hi", "author_name": "Ann"}));
        assert_eq!(message.text(), Some("hi"));
        assert_eq!(message.author_name(), Some("Ann"));

        let user = User::new(json!({"id": "U", "name": "Ann", "emails": ["a@x.io", 3]}));
        assert_eq!(user.name(), Some("Ann"));
        assert_eq!(user.emails(), vec!["a@x.io"]);
    }

    #[test]
    fn test_transparent_serde() {
        let user: User = serde_json::from_str(r#"{"id":"U"}"#).unwrap();
        assert_eq!(user.id(), Some("U"));
        assert_eq!(serde_json::to_string(&user).unwrap(), r#"{"id":"U"}"#);
    }
}

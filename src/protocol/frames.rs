//! Live channel frame schema.
//!
//! Every text frame on the channel is a JSON object discriminated by its `type` field:
//!
//! | `type` | Payload |
//! |--------|---------|
//! | `message` | `message`, `user`, `thread` objects |
//! | `heartbeat` | none |
//! | `alive` | `message` string |
//! | `error` | `debug` string |
//!
//! Unrecognized types decode to [`InboundFrame::Unknown`] so newer server frames do not break
//! older clients.

use crate::error::Result;
use crate::types::{Message, Thread, User};
use serde::Deserialize;

/// Frame type the client sends to ask the server for an `alive` reply.
pub const HEARTBEAT_TYPE: &str = "heartbeat";

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// A new message was posted to a thread the user can see
    Message {
        /// The posted message
        message: Message,
        /// Its author
        user: User,
        /// The thread it was posted to
        thread: Thread,
    },
    /// Server heartbeat
    Heartbeat,
    /// Reply to a client heartbeat
    Alive {
        /// Server-supplied text, usually `ok`
        #[serde(default)]
        message: String,
    },
    /// Server-side failure report
    Error {
        /// Diagnostic text
        #[serde(default)]
        debug: String,
    },
    /// Any type this client does not know
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    /// Decode one text frame.
    ///
    /// ```
    /// use quip_client::protocol::InboundFrame;
    ///
    /// let frame = InboundFrame::decode(r#"{"type":"alive","message":"ok"}"#).unwrap();
    /// assert_eq!(frame, InboundFrame::Alive { message: "ok".into() });
    ///
    /// let frame = InboundFrame::decode(r#"{"type":"typing","user_id":"U"}"#).unwrap();
    /// assert_eq!(frame, InboundFrame::Unknown);
    /// ```
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The heartbeat frame body, `{"type":"heartbeat"}`.
pub fn heartbeat_frame() -> String {
    serde_json::json!({ "type": HEARTBEAT_TYPE }).to_string()
}

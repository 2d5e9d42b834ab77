//! Events delivered by a live session.
//!
//! The reader task decodes each inbound frame into at most one [`ChannelEvent`] and queues it
//! on a bounded channel. [`SessionEvents`] is the receiving end, owned by the caller.
//!
//! # Examples
//!
//! ```ignore
//! use futures::StreamExt;
//! use quip_client::session::ChannelEvent;
//!
//! let mut events = session.open().await?;
//! while let Some(event) = events.next().await {
//!     match event {
//!         ChannelEvent::Message { message, .. } => println!("{:?}", message.text()),
//!         ChannelEvent::Error(debug) => eprintln!("channel error: {}", debug),
//!         _ => {}
//!     }
//! }
//! ```

use crate::protocol::InboundFrame;
use crate::types::{Message, Thread, User};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// A typed event from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A message was posted
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
    Alive(String),
    /// Server-reported failure, transport failure, or an undecodable frame
    Error(String),
}

impl ChannelEvent {
    /// Classify one text frame. Frames of an unknown type produce no event.
    ///
    /// ```
    /// use quip_client::session::ChannelEvent;
    ///
    /// assert_eq!(
    ///     ChannelEvent::from_frame(r#"{"type":"alive","message":"ok"}"#),
    ///     Some(ChannelEvent::Alive("ok".into()))
    /// );
    /// assert_eq!(ChannelEvent::from_frame(r#"{"type":"typing"}"#), None);
    /// ```
    pub fn from_frame(text: &str) -> Option<ChannelEvent> {
        match InboundFrame::decode(text) {
            Ok(frame) => Self::from_inbound(frame),
            Err(e) => Some(ChannelEvent::Error(format!("malformed frame: {}", e))),
        }
    }

    fn from_inbound(frame: InboundFrame) -> Option<ChannelEvent> {
        match frame {
            InboundFrame::Message {
                message,
                user,
                thread,
            } => Some(ChannelEvent::Message {
                message,
                user,
                thread,
            }),
            InboundFrame::Heartbeat => Some(ChannelEvent::Heartbeat),
            InboundFrame::Alive { message } => Some(ChannelEvent::Alive(message)),
            InboundFrame::Error { debug } => Some(ChannelEvent::Error(debug)),
            InboundFrame::Unknown => None,
        }
    }
}

/// Receiving end of a live session's events.
///
/// Ends (`None`) once the session's reader has stopped and every queued event was taken.
#[derive(Debug)]
pub struct SessionEvents {
    receiver: mpsc::Receiver<ChannelEvent>,
}

impl SessionEvents {
    pub(crate) fn new(receiver: mpsc::Receiver<ChannelEvent>) -> Self {
        SessionEvents { receiver }
    }

    /// Receive the next event.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.receiver.recv().await
    }

    /// Take an already queued event without waiting.
    pub fn try_next(&mut self) -> Option<ChannelEvent> {
        self.receiver.try_recv().ok()
    }

    /// Convert into a `ReceiverStream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ReceiverStream<ChannelEvent> {
        ReceiverStream::new(self.receiver)
    }
}

impl Stream for SessionEvents {
    type Item = ChannelEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

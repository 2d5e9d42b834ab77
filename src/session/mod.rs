//! Live session over the real-time push channel.
//!
//! A session is opened from a one-time [`SessionDescriptor`] obtained through
//! [`QuipClient::new_session`]. The channel is a WebSocket; inbound frames are classified by a
//! spawned reader task and delivered as [`ChannelEvent`]s through [`SessionEvents`].
//!
//! # State machine
//!
//! ```text
//! Closed --open()--> Opening --handshake--> Open --close()--> Closing --ack/timeout--> Closed
//!    ^                  |                     |
//!    +---- handshake ---+                     +---- peer closed / transport lost ----> Closed
//!          failed
//! ```
//!
//! All methods take `&self`, so a session can be shared between a heartbeat task and the task
//! that eventually closes it.

mod events;

pub use events::{ChannelEvent, SessionEvents};

use crate::client::{ClientConfig, QuipClient};
use crate::error::{QuipError, Result};
use crate::protocol::heartbeat_frame;
use crate::types::{Outcome, QuipRequest};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;

/// One-time credentials for a live session, from `/websockets/new`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDescriptor {
    /// User the session belongs to
    pub user_id: String,
    /// WebSocket URL to connect to
    pub url: String,
}

/// Lifecycle of a [`LiveSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channel; `open()` is allowed
    Closed,
    /// Handshake in progress
    Opening,
    /// Channel up, reader running
    Open,
    /// Close frame sent, waiting for the reader to drain
    Closing,
}

impl QuipClient {
    /// Request a session descriptor.
    pub async fn new_session(&self) -> Result<Outcome<SessionDescriptor>> {
        let request = QuipRequest::get(self.config().endpoint("/websockets/new"));
        self.fetch_typed(request).await
    }
}

/// A live session on the push channel.
pub struct LiveSession {
    descriptor: SessionDescriptor,
    state: Arc<Mutex<SessionState>>,
    sink: tokio::sync::Mutex<Option<WsSink>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    event_buffer: usize,
    close_timeout: Duration,
    enable_logging: bool,
}

impl LiveSession {
    /// A closed session for `descriptor`, using the buffer size, close timeout and logging switch of `config`.
    pub fn new(descriptor: SessionDescriptor, config: &ClientConfig) -> Self {
        LiveSession {
            descriptor,
            state: Arc::new(Mutex::new(SessionState::Closed)),
            sink: tokio::sync::Mutex::new(None),
            reader: Mutex::new(None),
            event_buffer: config.event_buffer.max(1),
            close_timeout: config.close_timeout(),
            enable_logging: config.enable_logging,
        }
    }

    /// Descriptor the session was created from.
    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock() = next;
    }

    /// Perform the handshake and start the reader.
    ///
    /// Only valid from `Closed`. A failed handshake returns the session to `Closed`.
    pub async fn open(&self) -> Result<SessionEvents> {
        {
            let mut state = self.state.lock();
            if *state != SessionState::Closed {
                return Err(QuipError::Session(format!(
                    "cannot open a session that is {:?}",
                    *state
                )));
            }
            *state = SessionState::Opening;
        }

        let stream = match self.handshake().await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(SessionState::Closed);
                return Err(e);
            }
        };

        let (sink, source) = stream.split();
        *self.sink.lock().await = Some(sink);

        let (tx, rx) = mpsc::channel(self.event_buffer);
        {
            // The reader only ever moves Open to Closed, so Open must be visible before it runs.
            let mut reader = self.reader.lock();
            self.set_state(SessionState::Open);
            *reader = Some(tokio::spawn(read_frames(
                source,
                tx,
                Arc::clone(&self.state),
                self.enable_logging,
            )));
        }

        if self.enable_logging {
            tracing::debug!(user_id = %self.descriptor.user_id, "Live session open");
        }
        Ok(SessionEvents::new(rx))
    }

    async fn handshake(&self) -> Result<WsStream> {
        let request = handshake_request(&self.descriptor.url)?;
        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }

    /// Send `{"type":"heartbeat"}`; the server answers with an `alive` frame.
    pub async fn heartbeat(&self) -> Result<()> {
        if self.state() != SessionState::Open {
            return Err(QuipError::Session(format!(
                "heartbeat requires an open session, state is {:?}",
                self.state()
            )));
        }
        let mut sink = self.sink.lock().await;
        let sink = sink
            .as_mut()
            .ok_or_else(|| QuipError::Session("session has no channel".into()))?;
        sink.send(WsMessage::Text(heartbeat_frame().into())).await?;
        Ok(())
    }

    /// Close with a normal-closure frame and wait for the reader to drain.
    ///
    /// Frames the peer sent before acknowledging are still delivered to [`SessionEvents`].
    /// The wait is bounded by the configured close timeout, after which the reader is aborted.
    /// Closing a closed session is a no-op.
    pub async fn close(&self) -> Result<()> {
        let was_open = {
            let mut state = self.state.lock();
            match *state {
                SessionState::Open => {
                    *state = SessionState::Closing;
                    true
                }
                SessionState::Closing => return Ok(()),
                SessionState::Opening => {
                    return Err(QuipError::Session(
                        "cannot close a session that is still opening".into(),
                    ))
                }
                SessionState::Closed => false,
            }
        };

        let sink = self.sink.lock().await.take();
        if !was_open {
            // Channel already gone: release the leftovers without touching the wire.
            drop(sink);
            if let Some(handle) = self.reader.lock().take() {
                handle.abort();
            }
            return Ok(());
        }

        if let Some(mut sink) = sink {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: "ok".into(),
            };
            if let Err(e) = sink.send(WsMessage::Close(Some(frame))).await {
                tracing::debug!("Close frame not sent: {}", e);
            }
        }

        let reader = self.reader.lock().take();
        if let Some(mut handle) = reader {
            if tokio::time::timeout(self.close_timeout, &mut handle)
                .await
                .is_err()
            {
                tracing::warn!(
                    "Peer did not acknowledge close within {:?}, aborting reader",
                    self.close_timeout
                );
                handle.abort();
            }
        }

        self.set_state(SessionState::Closed);
        Ok(())
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if let Some(handle) = self.reader.get_mut().take() {
            handle.abort();
        }
    }
}

/// Handshake request carrying `Origin: http://<channel host>`.
fn handshake_request(channel_url: &str) -> Result<Request> {
    let parsed = url::Url::parse(channel_url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| QuipError::Session(format!("channel URL has no host: {}", channel_url)))?;
    let origin = HeaderValue::from_str(&format!("http://{}", host))
        .map_err(|e| QuipError::WebSocket(e.to_string()))?;

    let mut request = channel_url.into_client_request()?;
    request.headers_mut().insert(ORIGIN, origin);
    Ok(request)
}

async fn read_frames(
    mut source: SplitStream<WsStream>,
    events: mpsc::Sender<ChannelEvent>,
    state: Arc<Mutex<SessionState>>,
    enable_logging: bool,
) {
    while let Some(next) = source.next().await {
        let message = match next {
            Ok(message) => message,
            Err(e) => {
                let open = *state.lock() == SessionState::Open;
                if open {
                    let _ = events.send(ChannelEvent::Error(e.to_string())).await;
                }
                break;
            }
        };

        let text = match message {
            WsMessage::Text(text) => text.to_string(),
            WsMessage::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => continue,
            },
            WsMessage::Close(frame) => {
                if enable_logging {
                    tracing::debug!("Channel closed by peer: {:?}", frame);
                }
                break;
            }
            _ => continue,
        };

        if enable_logging {
            tracing::debug!("WebSocket> {}", text);
        }

        if let Some(event) = ChannelEvent::from_frame(&text) {
            if events.send(event).await.is_err() {
                // Caller dropped the event stream.
                break;
            }
        }
    }

    let mut state = state.lock();
    if *state == SessionState::Open {
        *state = SessionState::Closed;
    }
}

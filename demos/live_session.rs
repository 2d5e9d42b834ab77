//! Print live channel events until Ctrl-C.
//!
//! ```sh
//! QUIP_ACCESS_TOKEN=... cargo run --example live_session
//! ```

use anyhow::{bail, Context, Result};
use quip_client::{ChannelEvent, ClientConfig, LiveSession, Outcome, QuipClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = ClientConfig::from_env();
    let token = config
        .access_token
        .clone()
        .context("QUIP_ACCESS_TOKEN is not set")?;
    let client = QuipClient::with_config(config);
    client.set_access_token(token).await?;

    let descriptor = match client.new_session().await? {
        Outcome::Value(descriptor) => descriptor,
        Outcome::Rejected(envelope) => bail!("session refused: {}", envelope),
    };
    info!(user_id = %descriptor.user_id, "Opening live session");

    let session = Arc::new(LiveSession::new(descriptor, client.config()));
    let mut events = session.open().await?;

    let heartbeat = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                if let Err(e) = session.heartbeat().await {
                    warn!("Heartbeat failed: {}", e);
                    break;
                }
            }
        })
    };

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(ChannelEvent::Message { message, user, thread }) => info!(
                    thread = thread.id().unwrap_or("?"),
                    author = user.name().unwrap_or("?"),
                    "{}",
                    message.text().unwrap_or("")
                ),
                Some(ChannelEvent::Alive(text)) => info!("alive: {}", text),
                Some(ChannelEvent::Heartbeat) => info!("server heartbeat"),
                Some(ChannelEvent::Error(detail)) => warn!("channel error: {}", detail),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    heartbeat.abort();
    session.close().await?;
    Ok(())
}

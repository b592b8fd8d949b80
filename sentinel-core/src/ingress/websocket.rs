use super::{EventIngress, decode::publish_frame};
use crate::backoff::Backoff;
use crate::bus::EventMultiplexer;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Live feed over a WebSocket carrying one JSON event (or batch) per text
/// frame.
#[derive(Debug, Clone)]
pub struct WebSocketIngress {
    url: Url,
    backoff: Backoff,
}

impl WebSocketIngress {
    pub fn new(url: Url, backoff: Backoff) -> Self {
        Self { url, backoff }
    }

    async fn session(
        &self,
        sink: &EventMultiplexer,
        cancel: &CancellationToken,
    ) -> bool {
        let stream = tokio::select! {
            _ = cancel.cancelled() => return false,
            connected = connect_async(self.url.as_str()) => match connected {
                Ok((stream, _response)) => stream,
                Err(err) => {
                    tracing::warn!(url = %self.url, error = %err, "WebSocket connect failed");
                    return false;
                }
            }
        };
        tracing::info!(url = %self.url, "WebSocket feed connected");

        let (mut write, mut read) = stream.split();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return true;
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        publish_frame(sink, "websocket", &text);
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => {
                            publish_frame(sink, "websocket", &text);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "dropping non UTF-8 binary frame");
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(err) = write.send(Message::Pong(payload)).await {
                            tracing::warn!(url = %self.url, error = %err, "WebSocket pong failed");
                            return true;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        tracing::warn!(url = %self.url, reason = ?reason, "WebSocket closed by server");
                        return true;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(url = %self.url, error = %err, "WebSocket read error");
                        return true;
                    }
                    None => {
                        tracing::warn!(url = %self.url, "WebSocket stream ended");
                        return true;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl EventIngress for WebSocketIngress {
    fn name(&self) -> &'static str {
        "websocket"
    }

    async fn run(self: Box<Self>, sink: EventMultiplexer, cancel: CancellationToken) {
        let mut attempt: u32 = 0;
        while !cancel.is_cancelled() {
            if self.session(&sink, &cancel).await {
                attempt = 0;
            }
            if cancel.is_cancelled() {
                break;
            }

            let delay = self.backoff.delay(attempt);
            tracing::info!(
                url = %self.url,
                attempt,
                delay_secs = delay.as_secs(),
                "reconnecting WebSocket feed"
            );
            attempt = attempt.saturating_add(1);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

use super::{EventIngress, decode::publish_frame};
use crate::backoff::Backoff;
use crate::bus::EventMultiplexer;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event as SseEvent, EventSource};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Live feed over server-sent events.
///
/// `reqwest-eventsource` has its own retry policy; it is closed on the first
/// error so reconnects follow the shared capped backoff instead.
#[derive(Debug, Clone)]
pub struct SseIngress {
    url: Url,
    client: reqwest::Client,
    backoff: Backoff,
}

impl SseIngress {
    pub fn new(url: Url, backoff: Backoff) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            backoff,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Runs one connection until it fails or is cancelled. Returns whether
    /// the stream opened successfully.
    async fn session(
        &self,
        sink: &EventMultiplexer,
        cancel: &CancellationToken,
    ) -> bool {
        let mut source = match EventSource::new(self.client.get(self.url.clone())) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "cannot build SSE request");
                return false;
            }
        };

        let mut opened = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    source.close();
                    return opened;
                }
                next = source.next() => match next {
                    Some(Ok(SseEvent::Open)) => {
                        tracing::info!(url = %self.url, "SSE feed connected");
                        opened = true;
                    }
                    Some(Ok(SseEvent::Message(message))) => {
                        if message.data.is_empty() || message.data == "keepalive" {
                            tracing::trace!("SSE keepalive");
                            continue;
                        }
                        publish_frame(sink, "sse", &message.data);
                    }
                    Some(Err(err)) => {
                        tracing::warn!(url = %self.url, error = %err, "SSE feed error");
                        source.close();
                        return opened;
                    }
                    None => {
                        tracing::warn!(url = %self.url, "SSE feed ended");
                        return opened;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl EventIngress for SseIngress {
    fn name(&self) -> &'static str {
        "sse"
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

            let delay: Duration = self.backoff.delay(attempt);
            tracing::info!(
                url = %self.url,
                attempt,
                delay_secs = delay.as_secs(),
                "reconnecting SSE feed"
            );
            attempt = attempt.saturating_add(1);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

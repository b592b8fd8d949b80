//! Sources that feed the [`EventMultiplexer`].
//!
//! Live transports and the synthetic generator implement the same
//! [`EventIngress`] trait, so subscribers cannot tell which one is running.

mod decode;
mod sse;
mod synthetic;
mod websocket;

pub use decode::{decode_frame, decode_payload, publish_frame};
pub use sse::SseIngress;
pub use synthetic::{SyntheticConfig, SyntheticIngress};
pub use websocket::WebSocketIngress;

use crate::bus::EventMultiplexer;

use async_trait::async_trait;
use std::fmt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait EventIngress: Send + 'static {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Feed `sink` until `cancel` fires. Transport faults are handled
    /// internally; returning means the ingress is finished.
    async fn run(self: Box<Self>, sink: EventMultiplexer, cancel: CancellationToken);
}

/// Owns a running ingress task. Dropping the handle stops the ingress.
pub struct IngressHandle {
    name: &'static str,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for IngressHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngressHandle")
            .field("name", &self.name)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl IngressHandle {
    pub fn spawn(ingress: Box<dyn EventIngress>, sink: EventMultiplexer) -> Self {
        let name = ingress.name();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tracing::info!(ingress = name, "starting event ingress");
        let task = tokio::spawn(async move {
            ingress.run(sink, token).await;
            tracing::info!(ingress = name, "event ingress stopped");
        });

        Self {
            name,
            cancel,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the ingress and wait for its task to wind down.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(ingress = self.name, error = %err, "ingress task ended abnormally");
            }
        }
    }
}

impl Drop for IngressHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

use super::topic::Topic;

use parking_lot::Mutex;
use sentinel_model::Event;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

type Listener = dyn Fn(&Event) + Send + Sync;

struct Entry {
    id: u64,
    active: AtomicBool,
    listener: Box<Listener>,
}

#[derive(Default)]
struct Registry {
    topics: Mutex<HashMap<Topic, Vec<Arc<Entry>>>>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl Registry {
    fn remove(&self, topic: &Topic, id: u64) {
        let mut topics = self.topics.lock();
        if let Some(entries) = topics.get_mut(topic) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

/// Fans every published [`Event`] out to the subscribers of its topics.
///
/// Listeners run synchronously on the publishing task, in subscription order
/// per topic. The registry lock is released before any listener runs, so a
/// listener may subscribe or unsubscribe (itself or a sibling) while a
/// publish is in flight: a sibling removed mid-publish is not invoked, and no
/// remaining listener is skipped.
#[derive(Clone, Default)]
pub struct EventMultiplexer {
    registry: Arc<Registry>,
}

impl fmt::Debug for EventMultiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMultiplexer")
            .field("topics", &self.topic_count())
            .field("published", &self.published())
            .finish()
    }
}

impl EventMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: impl Into<Topic>, listener: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let entry = Arc::new(Entry {
            id: self.registry.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            listener: Box::new(listener),
        });

        self.registry
            .topics
            .lock()
            .entry(topic.clone())
            .or_default()
            .push(Arc::clone(&entry));

        tracing::debug!(topic = %topic, subscription = entry.id, "subscribed");
        Subscription {
            registry: Arc::downgrade(&self.registry),
            topic,
            entry,
        }
    }

    /// Subscribe with an unbounded channel instead of a callback, for
    /// consumers that live on their own task.
    pub fn subscribe_channel(
        &self,
        topic: impl Into<Topic>,
    ) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(topic, move |event| {
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Deliver `event` to every wildcard subscriber and, for camera-scoped
    /// events, to every subscriber of that camera. Returns how many listeners
    /// were invoked.
    pub fn publish(&self, event: &Event) -> usize {
        self.registry.published.fetch_add(1, Ordering::Relaxed);

        let targets: Vec<Arc<Entry>> = {
            let topics = self.registry.topics.lock();
            let wildcard = topics.get(&Topic::All).into_iter().flatten();
            let scoped = event
                .camera_id()
                .and_then(|id| topics.get(&Topic::Camera(id.clone())))
                .into_iter()
                .flatten();
            wildcard.chain(scoped).cloned().collect()
        };

        let mut delivered = 0;
        for entry in targets {
            if entry.active.load(Ordering::Acquire) {
                (entry.listener)(event);
                delivered += 1;
            }
        }

        tracing::trace!(
            event_id = %event.id(),
            kind = %event.kind(),
            delivered,
            "event published"
        );
        delivered
    }

    pub fn topic_count(&self) -> usize {
        self.registry.topics.lock().len()
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.registry
            .topics
            .lock()
            .get(topic)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn published(&self) -> u64 {
        self.registry.published.load(Ordering::Relaxed)
    }
}

/// Handle to one registered listener. Unsubscribes on drop.
pub struct Subscription {
    registry: Weak<Registry>,
    topic: Topic,
    entry: Arc<Entry>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.entry.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn is_active(&self) -> bool {
        self.entry.active.load(Ordering::Acquire)
    }

    /// Remove exactly this listener. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if !self.entry.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.topic, self.entry.id);
        }
        tracing::debug!(topic = %self.topic, subscription = self.entry.id, "unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_model::{CameraEvent, CameraEventKind};
    use std::sync::atomic::AtomicUsize;

    fn camera_event(camera: &str) -> Event {
        CameraEvent::new(CameraEventKind::Detection, "e", camera, "car").into()
    }

    #[test]
    fn empty_topics_are_removed() {
        let mux = EventMultiplexer::new();
        let a = mux.subscribe("cam_01", |_| {});
        let b = mux.subscribe("cam_01", |_| {});
        assert_eq!(mux.subscriber_count(&Topic::camera("cam_01")), 2);

        a.unsubscribe();
        assert_eq!(mux.topic_count(), 1);
        drop(b);
        assert_eq!(mux.topic_count(), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mux = EventMultiplexer::new();
        let _other = mux.subscribe("cam_01", |_| {});
        let sub = mux.subscribe("cam_01", |_| {});
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(mux.subscriber_count(&Topic::camera("cam_01")), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn publish_counts_deliveries() {
        let mux = EventMultiplexer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _all = mux.subscribe(Topic::All, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let _cam = mux.subscribe("cam_01", |_| {});

        assert_eq!(mux.publish(&camera_event("cam_01")), 2);
        assert_eq!(mux.publish(&camera_event("cam_02")), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(mux.published(), 2);
    }

    #[test]
    fn handle_outliving_multiplexer_is_harmless() {
        let mux = EventMultiplexer::new();
        let sub = mux.subscribe(Topic::All, |_| {});
        drop(mux);
        sub.unsubscribe();
    }
}

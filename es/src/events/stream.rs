//! Stream session - one subscriber's lazy view over the bus
//!
//! An [`EventStream`] optionally replays retained history and then yields live
//! events as serialized JSON, suspending between events. Dropping the stream
//! (normal end, error, or a cancelled consumer task) unsubscribes its channel.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use super::EventError;
use super::bus::{EventBus, EventReceiver, SubscriberId};
use super::types::Event;

/// Per-subscriber sequence of events
pub struct EventStream {
    bus: Arc<EventBus>,
    id: SubscriberId,
    rx: EventReceiver,
}

impl EventStream {
    /// Open a session on the bus, replaying history first when `replay` is set
    pub fn open(bus: Arc<EventBus>, replay: bool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = bus.subscribe_channel(tx, replay);
        debug!(subscriber = id, replay, "EventStream::open");
        Self { bus, id, rx }
    }

    /// Subscriber id of this session
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the bus has disconnected this subscriber.
    pub async fn next_event(&mut self) -> Option<Arc<Event>> {
        self.rx.recv().await
    }

    /// Wait for the next event, serialized for a transport
    pub async fn next_json(&mut self) -> Option<Result<String, EventError>> {
        self.next_event().await.map(|event| event.to_json())
    }
}

impl Stream for EventStream {
    type Item = Result<String, EventError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx
            .poll_recv(cx)
            .map(|event| event.map(|event| event.to_json()))
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        debug!(subscriber = self.id, "EventStream::drop: releasing subscription");
        self.bus.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventType;
    use futures::StreamExt;
    use serde_json::Value;

    fn chat(text: &str) -> Event {
        let mut event = Event::new(EventType::Chat);
        event.content = Some(text.to_string());
        event
    }

    fn content_of(line: &str) -> String {
        let value: Value = serde_json::from_str(line).unwrap();
        value["content"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_stream_replays_then_goes_live() {
        let bus = EventBus::new(10).shared();
        bus.append(chat("a"));
        bus.append(chat("b"));

        let mut stream = EventStream::open(Arc::clone(&bus), true);
        bus.append(chat("c"));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let line = stream.next().await.unwrap().unwrap();
            seen.push(content_of(&line));
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stream_without_replay() {
        let bus = EventBus::new(10).shared();
        bus.append(chat("before"));

        let mut stream = EventStream::open(Arc::clone(&bus), false);
        bus.append(chat("after"));

        let line = stream.next_json().await.unwrap().unwrap();
        assert_eq!(content_of(&line), "after");
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = EventBus::new(10).shared();
        let stream = EventStream::open(Arc::clone(&bus), false);
        let id = stream.id();
        assert_eq!(bus.subscriber_count(), 1);

        drop(stream);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_cancelled_consumer_releases_subscription() {
        let bus = EventBus::new(10).shared();
        let stream = EventStream::open(Arc::clone(&bus), false);

        let consumer = tokio::spawn(async move {
            let mut stream = stream;
            while stream.next_event().await.is_some() {}
        });
        tokio::task::yield_now().await;
        assert_eq!(bus.subscriber_count(), 1);

        consumer.abort();
        let _ = consumer.await;
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_after_disconnect_all() {
        let bus = EventBus::new(10).shared();
        let mut stream = EventStream::open(Arc::clone(&bus), false);
        bus.append(chat("x"));
        bus.disconnect_all();

        assert!(stream.next_event().await.is_some());
        assert!(stream.next_event().await.is_none());
    }
}

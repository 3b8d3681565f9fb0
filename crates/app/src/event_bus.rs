//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use homectl_domain::error::RemoteError;
use homectl_domain::event::{DeviceEvent, Event};

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RemoteError>> + Send {
        // send only fails without receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

/// Wrap store transitions in envelopes and publish them in order.
///
/// Failures are logged and skipped. Returns how many events were published.
pub async fn publish_events<P: EventPublisher>(publisher: &P, events: Vec<DeviceEvent>) -> usize {
    let mut published = 0;
    for payload in events {
        let event = Event::new(payload);
        let topic = event.topic.clone();
        match publisher.publish(event).await {
            Ok(()) => {
                tracing::trace!(%topic, "event published");
                published += 1;
            }
            Err(err) => tracing::warn!(%topic, error = %err, "failed to publish event"),
        }
    }
    published
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::testing::RecordingPublisher;

    fn added(identifier: &str) -> DeviceEvent {
        DeviceEvent::DeviceAdded {
            identifier: identifier.to_string(),
            state: json!({}),
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        let event = Event::new(added("lamp"));
        let event_id = event.id;

        bus.publish(event).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event_id);
        assert_eq!(received.topic, "device-added.lamp");
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = Event::new(added("lamp"));
        let event_id = event.id;

        bus.publish(event).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().id, event_id);
        assert_eq!(rx2.recv().await.unwrap().id, event_id);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert!(bus.publish(Event::new(added("lamp"))).await.is_ok());
    }

    #[tokio::test]
    async fn should_publish_events_in_order() {
        let publisher = RecordingPublisher::default();
        let published = publish_events(&publisher, vec![added("a"), added("b")]).await;
        assert_eq!(published, 2);
        assert_eq!(publisher.topics(), ["device-added.a", "device-added.b"]);
    }

    #[tokio::test]
    async fn should_count_nothing_when_publisher_fails() {
        let publisher = RecordingPublisher::default();
        publisher.failing.store(true, Ordering::SeqCst);
        assert_eq!(publish_events(&publisher, vec![added("a")]).await, 0);
    }
}

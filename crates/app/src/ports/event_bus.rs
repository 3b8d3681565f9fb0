//! Event bus port: publish/subscribe for device store transitions.

use std::future::Future;

use homectl_domain::error::RemoteError;
use homectl_domain::event::Event;

/// Publishes events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).publish(event)
    }
}

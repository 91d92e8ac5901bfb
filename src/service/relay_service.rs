//! Relay service: the single entry point HTTP handlers use to publish and
//! to open subscriptions.

use crate::domain::{Broadcaster, DeliveryError, Message, PublishReport, SubscriptionGuard};
use crate::error::RelayError;

/// Orchestration layer between HTTP handlers and the [`Broadcaster`].
///
/// Stateless apart from the optional message size policy. All fan-out
/// semantics live in the broadcaster; this type adds validation and logging.
#[derive(Debug, Clone)]
pub struct RelayService {
    broadcaster: Broadcaster,
    max_message_bytes: Option<usize>,
}

impl RelayService {
    /// Creates a new `RelayService` over `broadcaster`.
    #[must_use]
    pub fn new(broadcaster: Broadcaster, max_message_bytes: Option<usize>) -> Self {
        Self {
            broadcaster,
            max_message_bytes,
        }
    }

    /// Publishes `message` to every connected listener.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MessageTooLarge`] if a size limit is configured
    /// and `message` exceeds it. Delivery problems are never reported here.
    pub fn submit(&self, message: Message) -> Result<PublishReport, RelayError> {
        if let Some(max) = self.max_message_bytes
            && message.len() > max
        {
            return Err(RelayError::MessageTooLarge {
                len: message.len(),
                max,
            });
        }

        let report = self.broadcaster.publish(&message);
        tracing::debug!(
            bytes = message.len(),
            delivered = report.delivered,
            failed = report.failed,
            "message published"
        );
        Ok(report)
    }

    /// Registers a listener that lives as long as the returned guard.
    pub fn listen<F>(&self, on_message: F) -> SubscriptionGuard
    where
        F: Fn(&Message) -> Result<(), DeliveryError> + Send + Sync + 'static,
    {
        self.broadcaster.subscribe_scoped(on_message)
    }

    /// Returns the number of connected listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}

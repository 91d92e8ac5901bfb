//! In-process publish/subscribe hub for chat messages.
//!
//! [`Broadcaster`] keeps the set of live subscriptions and fans every
//! published [`Message`] out to all of them, synchronously, from the
//! publisher's own context. There is no queue and no backlog: a message
//! published while nobody listens is gone.
//!
//! Each subscription is a callback guarded by its own mutex. `publish`
//! takes a snapshot of the set under the read lock, then delivers to each
//! entry through that entry's gate; `unsubscribe` empties the gate, so once
//! it returns no new invocation of the callback can begin.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::{Message, SubscriptionId};

/// Failure reported by a subscriber callback.
///
/// Returning an error tells the broadcaster the subscriber can no longer
/// receive messages; the registration is dropped after the current publish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The receiving side of the subscriber's connection is gone.
    #[error("subscriber connection closed")]
    Closed,

    /// Writing to the subscriber failed for another reason.
    #[error("subscriber write failed: {0}")]
    Write(String),
}

/// Outcome of a single [`Broadcaster::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Callbacks that accepted the message.
    pub delivered: usize,
    /// Callbacks that returned an error or panicked. Their registrations
    /// have been removed.
    pub failed: usize,
}

type Callback = Box<dyn Fn(&Message) -> Result<(), DeliveryError> + Send + Sync>;

/// One registration: the callback slot is emptied on removal.
struct Slot {
    callback: Mutex<Option<Callback>>,
}

enum Delivery {
    Delivered,
    Removed,
    Failed(String),
}

impl Slot {
    fn new(callback: Callback) -> Self {
        Self {
            callback: Mutex::new(Some(callback)),
        }
    }

    fn deliver(&self, message: &Message) -> Delivery {
        let guard = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(callback) = guard.as_ref() else {
            return Delivery::Removed;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| callback(message))) {
            Ok(Ok(())) => Delivery::Delivered,
            Ok(Err(err)) => Delivery::Failed(err.to_string()),
            Err(_) => Delivery::Failed("subscriber callback panicked".to_string()),
        }
    }

    /// Blocks until any in-flight delivery finishes, then disarms the slot.
    fn close(&self) -> Option<Callback> {
        self.callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Token returned by [`Broadcaster::subscribe`].
///
/// Its only capability is removing exactly the registration it was issued
/// for. Passing it to [`Broadcaster::unsubscribe`] more than once is a no-op.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping the handle leaks the subscription; use SubscriptionGuard for scoped release"]
pub struct SubscriptionHandle {
    id: SubscriptionId,
}

impl SubscriptionHandle {
    /// Returns the identity of the registration.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Process-wide broadcast hub.
///
/// Cheap to clone; all clones share the same subscriber set. Construct one
/// at startup and hand it to whatever needs to publish or subscribe.
#[derive(Clone, Default)]
pub struct Broadcaster {
    subscribers: Arc<RwLock<HashMap<SubscriptionId, Arc<Slot>>>>,
}

impl Broadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `on_message` to be called for every message published from
    /// now on.
    ///
    /// The callback runs on the publisher's thread and must not block. It
    /// must not unsubscribe its own registration; it reports a dead
    /// connection by returning an error instead.
    pub fn subscribe<F>(&self, on_message: F) -> SubscriptionHandle
    where
        F: Fn(&Message) -> Result<(), DeliveryError> + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let slot = Arc::new(Slot::new(Box::new(on_message)));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, slot);
        tracing::debug!(subscription_id = %id, "subscriber registered");
        SubscriptionHandle { id }
    }

    /// Like [`Self::subscribe`], but returns a guard that unsubscribes when
    /// dropped.
    pub fn subscribe_scoped<F>(&self, on_message: F) -> SubscriptionGuard
    where
        F: Fn(&Message) -> Result<(), DeliveryError> + Send + Sync + 'static,
    {
        SubscriptionGuard {
            handle: Some(self.subscribe(on_message)),
            broadcaster: self.clone(),
        }
    }

    /// Removes the registration behind `handle`.
    ///
    /// Returns `true` if this call removed it, `false` if it was already
    /// gone. When this returns, the callback will not be invoked again;
    /// a delivery that was already running has completed.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.remove(handle.id)
    }

    /// Delivers `message` to every current subscriber.
    ///
    /// Subscriber failures (errors or panics) are contained: they are logged,
    /// the failing registration is removed, and delivery continues with the
    /// remaining subscribers.
    pub fn publish(&self, message: &Message) -> PublishReport {
        let snapshot = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut report = PublishReport::default();
        let mut dead = Vec::new();
        for (id, slot) in snapshot {
            match slot.deliver(message) {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Removed => {}
                Delivery::Failed(reason) => {
                    tracing::warn!(subscription_id = %id, %reason, "dropping failed subscriber");
                    report.failed += 1;
                    dead.push(id);
                }
            }
        }

        for id in dead {
            self.remove(id);
        }
        report
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let slot = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        let Some(slot) = slot else {
            return false;
        };
        // Taken outside the map lock so a slow in-flight delivery does not
        // stall other subscribers.
        drop(slot.close());
        tracing::debug!(subscription_id = %id, "subscriber removed");
        true
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Owns a subscription and releases it exactly once.
///
/// Release happens on the first of [`SubscriptionGuard::release`] or drop,
/// which covers every way a connection can end: clean close, error, or the
/// owning task being cancelled.
#[derive(Debug)]
pub struct SubscriptionGuard {
    handle: Option<SubscriptionHandle>,
    broadcaster: Broadcaster,
}

impl SubscriptionGuard {
    /// Identity of the guarded registration.
    #[must_use]
    pub fn id(&self) -> Option<SubscriptionId> {
        self.handle.as_ref().map(SubscriptionHandle::id)
    }

    /// Unsubscribes now. Later calls, and the eventual drop, do nothing.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.broadcaster.unsubscribe(&handle);
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

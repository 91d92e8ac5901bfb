//! SSE connection state machine.
//!
//! An [`SseConnection`] is the response body of one `GET /sse` request. It
//! owns the connection's subscription: registered when the connection is
//! opened, released when the body is dropped. Axum drops the body when the
//! client goes away, when writing to the socket fails, and on shutdown, so
//! every exit path unsubscribes.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Bytes;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::frame::{KEEP_ALIVE, encode_event};
use crate::domain::{DeliveryError, Message, SubscriptionGuard, SubscriptionId};
use crate::service::RelayService;

/// Lifecycle of a streaming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Subscribed, response headers not yet sent.
    Opening,
    /// Body is being polled; messages are forwarded as events.
    Streaming,
    /// Subscription released. Terminal.
    Closed,
}

/// Why a connection reached [`ConnectionState::Closed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// The response body was dropped: client gone, write error, or shutdown.
    Dropped,
    /// The broadcaster removed the subscription.
    SubscriptionEnded,
}

/// Stream of encoded SSE frames for a single client.
#[derive(Debug)]
pub struct SseConnection {
    state: ConnectionState,
    receiver: mpsc::UnboundedReceiver<Message>,
    subscription: Option<SubscriptionGuard>,
    keep_alive: Option<Interval>,
}

impl SseConnection {
    /// Subscribes a new connection to `service`.
    ///
    /// The subscriber callback only enqueues, so publishing never waits on
    /// this client's socket. With `keep_alive` set, a comment frame is sent
    /// after each idle period of that length; this needs a Tokio runtime.
    #[must_use]
    pub fn open(service: &RelayService, keep_alive: Option<Duration>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = service.listen(move |message: &Message| {
            sender
                .send(message.clone())
                .map_err(|_| DeliveryError::Closed)
        });
        tracing::info!(
            subscription_id = ?subscription.id(),
            listeners = service.listener_count(),
            "sse client connected"
        );
        let keep_alive = keep_alive.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self {
            state: ConnectionState::Opening,
            receiver,
            subscription: Some(subscription),
            keep_alive,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Identity of the underlying subscription while it is held.
    #[must_use]
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().and_then(SubscriptionGuard::id)
    }

    fn close(&mut self, reason: CloseReason) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        let id = self.subscription_id();
        self.subscription = None;
        self.receiver.close();
        tracing::info!(subscription_id = ?id, ?reason, "sse client disconnected");
    }
}

impl Stream for SseConnection {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.state {
            ConnectionState::Closed => return Poll::Ready(None),
            ConnectionState::Opening => this.state = ConnectionState::Streaming,
            ConnectionState::Streaming => {}
        }

        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(message)) => {
                if let Some(interval) = this.keep_alive.as_mut() {
                    interval.reset();
                }
                return Poll::Ready(Some(Ok(encode_event(message.as_str()))));
            }
            Poll::Ready(None) => {
                this.close(CloseReason::SubscriptionEnded);
                return Poll::Ready(None);
            }
            Poll::Pending => {}
        }

        if let Some(interval) = this.keep_alive.as_mut()
            && interval.poll_tick(cx).is_ready()
        {
            return Poll::Ready(Some(Ok(Bytes::from_static(KEEP_ALIVE))));
        }
        Poll::Pending
    }
}

impl Drop for SseConnection {
    fn drop(&mut self) {
        self.close(CloseReason::Dropped);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Broadcaster;
    use futures_util::StreamExt;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready};

    fn service() -> RelayService {
        RelayService::new(Broadcaster::new(), None)
    }

    fn frame(item: Option<Result<Bytes, Infallible>>) -> String {
        let Some(Ok(bytes)) = item else {
            panic!("expected a frame, got {item:?}");
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn open_registers_subscription() {
        let service = service();
        let conn = SseConnection::open(&service, None);
        assert_eq!(conn.state(), ConnectionState::Opening);
        assert!(conn.subscription_id().is_some());
        assert_eq!(service.listener_count(), 1);
    }

    #[test]
    fn first_poll_starts_streaming() {
        let service = service();
        let mut stream = task::spawn(SseConnection::open(&service, None));

        assert_pending!(stream.poll_next());
        assert_eq!(stream.state(), ConnectionState::Streaming);
    }

    #[test]
    fn published_messages_become_events() {
        let service = service();
        let mut stream = task::spawn(SseConnection::open(&service, None));
        assert_pending!(stream.poll_next());

        let Ok(report) = service.submit(Message::from("hello")) else {
            panic!("submit failed");
        };
        assert_eq!(report.delivered, 1);
        assert!(stream.is_woken());

        assert_eq!(frame(assert_ready!(stream.poll_next())), "data: hello\n\n");
        assert_pending!(stream.poll_next());
    }

    #[test]
    fn each_message_is_one_event() {
        let service = service();
        let mut stream = task::spawn(SseConnection::open(&service, None));

        for text in ["a", "", "multi\nline"] {
            assert!(service.submit(Message::from(text)).is_ok());
        }
        assert_eq!(frame(assert_ready!(stream.poll_next())), "data: a\n\n");
        assert_eq!(frame(assert_ready!(stream.poll_next())), "data: \n\n");
        assert_eq!(
            frame(assert_ready!(stream.poll_next())),
            "data: multi\ndata: line\n\n"
        );
        assert_pending!(stream.poll_next());
    }

    #[test]
    fn abrupt_disconnect_unsubscribes() {
        let service = service();
        let conn = SseConnection::open(&service, None);
        let _other = SseConnection::open(&service, None);
        assert_eq!(service.listener_count(), 2);

        drop(conn);
        assert_eq!(service.listener_count(), 1);

        let Ok(report) = service.submit(Message::from("x")) else {
            panic!("submit failed");
        };
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn close_releases_subscription_and_ends_stream() {
        let service = service();
        let mut stream = task::spawn(SseConnection::open(&service, None));
        assert_pending!(stream.poll_next());

        stream.close(CloseReason::SubscriptionEnded);
        assert_eq!(stream.state(), ConnectionState::Closed);
        assert!(stream.subscription_id().is_none());
        assert_eq!(service.listener_count(), 0);
        assert!(assert_ready!(stream.poll_next()).is_none());

        // Closing again (and the final drop) must not touch the hub.
        let _late = SseConnection::open(&service, None);
        stream.close(CloseReason::Dropped);
        drop(stream);
        assert_eq!(service.listener_count(), 1);
    }

    #[tokio::test]
    async fn idle_connection_sends_keep_alive_comments() {
        let service = service();
        let mut conn = SseConnection::open(&service, Some(Duration::from_millis(20)));

        let next = tokio::time::timeout(Duration::from_secs(5), conn.next()).await;
        let Ok(item) = next else {
            panic!("no keep-alive within timeout");
        };
        assert_eq!(frame(item), ":\n\n");
        assert_eq!(conn.state(), ConnectionState::Streaming);

        assert!(service.submit(Message::from("after")).is_ok());
        assert_eq!(frame(conn.next().await), "data: after\n\n");
    }
}

//! Queue event fan-out.

use chrono::{DateTime, Utc};
use openmic_common::events::QueueEvent;
use openmic_common::models::{Request, RequestStatus};
use tokio::sync::broadcast;
use tracing::info;

/// Broadcasts queue mutations to every connected WebSocket client.
///
/// Cloning is cheap; all clones share one channel. Delivery is at most once:
/// a slow client loses the oldest undelivered events, and nothing is replayed
/// after a reconnect.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<QueueEvent>,
}

impl Notifier {
    /// Create a notifier buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("Queue notifier initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Start receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// Number of currently subscribed connections.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn request_created(&self, request: Request) {
        self.publish(QueueEvent::RequestNew(request));
    }

    pub fn status_changed(&self, id: String, status: RequestStatus, updated_at: DateTime<Utc>) {
        self.publish(QueueEvent::RequestUpdate {
            id,
            status,
            updated_at,
        });
    }

    pub fn request_removed(&self, id: String) {
        self.publish(QueueEvent::RequestDelete { id });
    }

    pub fn queue_cleared(&self) {
        self.publish(QueueEvent::RequestsClear);
    }

    // Fire-and-forget; having no listeners is not an error.
    fn publish(&self, event: QueueEvent) {
        tracing::debug!(
            event = event.name(),
            receivers = self.client_count(),
            "Broadcasting queue event"
        );
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_subscriber_gets_exactly_one_copy() {
        let notifier = Notifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();
        assert_eq!(notifier.client_count(), 2);

        notifier.request_removed("abc".to_string());

        let got = first.recv().await.unwrap();
        assert!(matches!(got, QueueEvent::RequestDelete { ref id } if id == "abc"));
        let got = second.recv().await.unwrap();
        assert!(matches!(got, QueueEvent::RequestDelete { ref id } if id == "abc"));

        assert!(first.try_recv().is_err());
        assert!(second.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        let notifier = Notifier::new(8);
        notifier.queue_cleared();
        assert_eq!(notifier.client_count(), 0);
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let notifier = Notifier::new(8);
        notifier.request_removed("early".to_string());

        let mut rx = notifier.subscribe();
        assert!(rx.try_recv().is_err());
    }
}

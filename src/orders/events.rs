// Order change notification hub
//
// In-process broadcast channel used to push status changes to
// subscribed views (admin dashboard, customer tracker) without tying
// the core to any pub/sub vendor. Delivery is best-effort: slow
// subscribers may observe gaps and re-fetch on their next read.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::orders::models::OrderStatus;

/// Default buffer per subscriber before older events are dropped
const DEFAULT_CAPACITY: usize = 64;

/// One order lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

/// Broadcast hub for order events
///
/// Cloning shares the same channel. Publishing never blocks and never
/// fails; with no live subscribers the event is simply dropped.
#[derive(Clone)]
pub struct OrderEvents {
    sender: broadcast::Sender<OrderEvent>,
}

impl OrderEvents {
    /// Create a hub with the default buffer size
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a hub with an explicit per-subscriber buffer size
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to order events
    ///
    /// Dropping the returned subscription unsubscribes; there is no
    /// explicit teardown call.
    pub fn subscribe(&self) -> OrderSubscription {
        OrderSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish an event to every live subscriber
    pub fn publish(&self, event: OrderEvent) {
        // Err only means nobody is listening right now
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the event stream
pub struct OrderSubscription {
    receiver: broadcast::Receiver<OrderEvent>,
}

impl OrderSubscription {
    /// Wait for the next event
    ///
    /// Returns None once the hub is gone. A lagged subscriber skips the
    /// overwritten events and continues with the newest available.
    pub async fn next(&mut self) -> Option<OrderEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("Order event subscriber lagged, missed {} events", missed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: OrderStatus) -> OrderEvent {
        OrderEvent {
            order_id: Uuid::new_v4(),
            status,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let hub = OrderEvents::new();
        let mut subscription = hub.subscribe();

        let published = event(OrderStatus::Confirmed);
        hub.publish(published.clone());

        let received = subscription.next().await.unwrap();
        assert_eq!(received, published);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let hub = OrderEvents::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        let published = event(OrderStatus::Preparing);
        hub.publish(published.clone());

        assert_eq!(first.next().await.unwrap(), published);
        assert_eq!(second.next().await.unwrap(), published);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_no_op() {
        let hub = OrderEvents::new();

        // Must not panic or error
        hub.publish(event(OrderStatus::Cancelled));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let hub = OrderEvents::new();
        let subscription = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let hub = OrderEvents::new();
        let mut subscription = hub.subscribe();

        let first = event(OrderStatus::Confirmed);
        let second = event(OrderStatus::Preparing);
        hub.publish(first.clone());
        hub.publish(second.clone());

        assert_eq!(subscription.next().await.unwrap(), first);
        assert_eq!(subscription.next().await.unwrap(), second);
    }
}

//! Kitchen consumer
//!
//! Background task joining the event channel under a consumer name and
//! relaying every `order-items.created` payload to the broadcast hub.
//! The message counts as processed only after the hub hand-off
//! succeeds.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use shared::message::{ChannelMessage, topics};

use crate::hub::HubHandle;

pub struct KitchenConsumer {
    name: String,
    receiver: broadcast::Receiver<ChannelMessage>,
    hub: HubHandle,
    shutdown: CancellationToken,
}

impl KitchenConsumer {
    pub fn new(
        name: impl Into<String>,
        receiver: broadcast::Receiver<ChannelMessage>,
        hub: HubHandle,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            receiver,
            hub,
            shutdown,
        }
    }

    /// Consume until the channel closes or shutdown is requested.
    ///
    /// A lagged receiver (the channel overwrote entries faster than we
    /// drained them) re-signals ready and keeps consuming; a closed
    /// channel during shutdown is expected and exits quietly.
    pub async fn run(mut self) {
        tracing::info!(consumer = %self.name, "Kitchen consumer ready");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!(consumer = %self.name, "Kitchen consumer shutting down");
                    break;
                }

                result = self.receiver.recv() => match result {
                    Ok(msg) => self.handle_message(msg).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            consumer = %self.name,
                            skipped,
                            "Consumer lagged behind the channel"
                        );
                        tracing::info!(consumer = %self.name, "Kitchen consumer ready");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!(consumer = %self.name, "Event channel closed");
                        break;
                    }
                }
            }
        }

        tracing::info!(consumer = %self.name, "Kitchen consumer stopped");
    }

    async fn handle_message(&self, msg: ChannelMessage) {
        if msg.topic != topics::ORDER_ITEMS_CREATED {
            return;
        }
        if let Err(e) = self.hub.broadcast(msg.payload).await {
            tracing::error!(
                consumer = %self.name,
                message_id = %msg.id,
                error = %e,
                "Failed to hand message to the hub"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use crate::hub::{ConnectionMessage, DisplayConnection, KitchenHub};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, OrderItemStatus};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn sample_item() -> OrderItem {
        OrderItem {
            id: 7,
            order_id: 3,
            product_id: 100,
            status: OrderItemStatus::Pending,
            product_name: "แกงเขียวหวาน".into(),
            product_name_en: "Green Curry".into(),
            price: Decimal::new(12000, 2),
            quantity: 1,
            note: None,
            image: Some("green-curry.jpg".into()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn published_item_reaches_the_display_intact() {
        let token = CancellationToken::new();
        let (hub_handle, hub) = KitchenHub::new(token.clone());
        tokio::spawn(hub.run());

        let (tx, mut rx) = mpsc::channel(8);
        hub_handle
            .register(DisplayConnection::new(1, tx))
            .await
            .unwrap();

        let channel = Arc::new(EventChannel::new(16));
        let consumer = KitchenConsumer::new(
            "kitchen-display",
            channel.subscribe(),
            hub_handle,
            token.clone(),
        );
        tokio::spawn(consumer.run());

        let item = sample_item();
        channel
            .publish(ChannelMessage::order_item_created(&item).unwrap())
            .unwrap();

        let frame = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let ConnectionMessage::Data(bytes) = frame else {
            panic!("expected a data frame");
        };
        let decoded: OrderItem = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, item);
    }

    #[tokio::test]
    async fn foreign_topics_are_ignored() {
        let token = CancellationToken::new();
        let (hub_handle, hub) = KitchenHub::new(token.clone());
        tokio::spawn(hub.run());

        let (tx, mut rx) = mpsc::channel(8);
        hub_handle
            .register(DisplayConnection::new(1, tx))
            .await
            .unwrap();

        let channel = Arc::new(EventChannel::new(16));
        let consumer = KitchenConsumer::new(
            "kitchen-display",
            channel.subscribe(),
            hub_handle,
            token.clone(),
        );
        tokio::spawn(consumer.run());

        channel
            .publish(ChannelMessage {
                id: uuid::Uuid::new_v4(),
                topic: "unrelated.topic".into(),
                payload: b"x".to_vec(),
            })
            .unwrap();

        let item = sample_item();
        channel
            .publish(ChannelMessage::order_item_created(&item).unwrap())
            .unwrap();

        // Only the order-item frame comes through.
        let frame = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let ConnectionMessage::Data(bytes) = frame else {
            panic!("expected a data frame");
        };
        assert_eq!(
            serde_json::from_slice::<OrderItem>(&bytes).unwrap().id,
            item.id
        );
        assert!(rx.try_recv().is_err());
    }
}

//! Order item producer
//!
//! Publishes newly created order items to the event channel, one
//! message per item, in ascending-ID order so consumers observe
//! creation order consistently.

use std::sync::Arc;

use shared::error::AppResult;
use shared::message::ChannelMessage;
use shared::models::OrderItem;

use super::EventChannel;

#[derive(Clone)]
pub struct ItemProducer {
    channel: Arc<EventChannel>,
}

impl ItemProducer {
    pub fn new(channel: Arc<EventChannel>) -> Self {
        Self { channel }
    }

    /// Publish a single item, waiting for channel acknowledgment.
    pub fn publish_item(&self, item: &OrderItem) -> AppResult<()> {
        let msg = ChannelMessage::order_item_created(item)?;
        self.channel.publish(msg)
    }

    /// Publish a batch of just-created items.
    ///
    /// Best-effort fan-out: the durable write already succeeded, so a
    /// lost notification degrades the live display but not the order
    /// itself. A single item's failure is logged and the loop continues.
    pub fn publish_batch(&self, items: &[OrderItem]) {
        let mut ordered: Vec<&OrderItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.id);

        for item in ordered {
            if let Err(e) = self.publish_item(item) {
                tracing::warn!(
                    item_id = item.id,
                    order_id = item.order_id,
                    error = %e,
                    "Failed to publish order item; kitchen display may miss it"
                );
            }
        }
    }
}

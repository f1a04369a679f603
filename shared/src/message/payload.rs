use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::OrderItem;

/// A single message on the event channel
///
/// The payload is carried as raw JSON bytes: producers encode once and
/// consumers forward the bytes untouched to display clients, decoding
/// only when they need the typed value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelMessage {
    /// Unique message id (consumer-side de-duplication)
    pub id: Uuid,
    /// Topic this message belongs to
    pub topic: String,
    /// JSON-encoded payload
    pub payload: Vec<u8>,
}

impl ChannelMessage {
    /// Wrap an order item for the `order-items.created` topic.
    pub fn order_item_created(item: &OrderItem) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            topic: super::topics::ORDER_ITEMS_CREATED.to_string(),
            payload: serde_json::to_vec(item)?,
        })
    }

    /// Decode the payload as an order item.
    pub fn decode_order_item(&self) -> Result<OrderItem, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

//! Event channel message types
//!
//! Messages flowing over the platform's event channel between the order
//! workflow (producer) and the kitchen display service (consumer).

mod payload;

pub use payload::ChannelMessage;

/// Fixed topic names
pub mod topics {
    /// Newly created order items, one message per item
    pub const ORDER_ITEMS_CREATED: &str = "order-items.created";
}

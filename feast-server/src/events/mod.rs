//! Event channel
//!
//! Publish/subscribe fabric between the order workflow and the kitchen
//! display. One producer publishes newly created order items; one named
//! consumer forwards them to the broadcast hub.

mod channel;
mod consumer;
mod producer;

pub use channel::EventChannel;
pub use consumer::KitchenConsumer;
pub use producer::ItemProducer;

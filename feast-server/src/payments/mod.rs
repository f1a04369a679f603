//! Payment settlement workflow
//!
//! Settles an order once every item is terminal: computes the amount
//! from served items, records the payment, completes the order and
//! closes the table session.

mod workflow;

pub use workflow::PaymentWorkflow;

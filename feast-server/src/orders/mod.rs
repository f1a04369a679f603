//! Order workflow
//!
//! Create-or-attach against the caller's table session, item appends,
//! per-item status transitions with table-status recomputation, and
//! paginated reads with concurrent count+page fan-out.

pub mod number;
mod workflow;

pub use workflow::{OrderWithItems, OrderWorkflow};

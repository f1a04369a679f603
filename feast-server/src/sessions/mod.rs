//! Table-session workflow
//!
//! Owns the session lifecycle: open (reserve a table, mint a session,
//! cache it, persist it), extend (TTL bump under a cap), close
//! (cache delete + durable close), and current-session reads.

mod workflow;

pub use workflow::{OpenedSession, SessionConfig, SessionWorkflow};

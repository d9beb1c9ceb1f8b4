//! Session coordination for Podium.
//!
//! This crate sits between the server's connection handlers and the lobby
//! engine:
//!
//! 1. **Routing**: knowing how to reach every connection
//!    ([`ConnectionRegistry`])
//! 2. **Coordination**: applying client events to lobbies and deciding
//!    who hears about it ([`SessionCoordinator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)       ← one task owns the coordinator, feeds it events
//!     ↕
//! Session (this crate) ← lobby mutations + fan-out of notifications
//!     ↕
//! Lobby (below)        ← membership, turns, scores
//! ```

mod coordinator;
mod registry;

pub use coordinator::{SessionCoordinator, TURN_TIMED_OUT, TurnStarted};
pub use registry::{ConnectionRegistry, ConnectionSender};

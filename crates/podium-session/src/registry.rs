//! Connection registry: who is connected and how to reach them.
//!
//! The registry is owned by the coordinator task, so a plain `HashMap` is
//! enough. Each connection's handler holds the receiving end of its
//! channel and writes whatever arrives to the socket.

use std::collections::HashMap;

use podium_protocol::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;

/// Channel the coordinator uses to push notifications to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Maps every live connection to its outbound channel.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    routes: HashMap<ConnectionId, ConnectionSender>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. A previous route for the same id is
    /// replaced and returned.
    pub fn insert(
        &mut self,
        conn: ConnectionId,
        sender: ConnectionSender,
    ) -> Option<ConnectionSender> {
        self.routes.insert(conn, sender)
    }

    pub fn remove(&mut self, conn: ConnectionId) -> Option<ConnectionSender> {
        self.routes.remove(&conn)
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.routes.contains_key(&conn)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Sends `event` to one connection.
    ///
    /// Returns `false` if the connection is unknown or its handler has
    /// already gone away. Neither is an error: the disconnect that follows
    /// cleans up.
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) -> bool {
        let Some(sender) = self.routes.get(&conn) else {
            tracing::debug!(%conn, event = event.name(), "no route to connection");
            return false;
        };
        if sender.send(event).is_err() {
            tracing::debug!(%conn, "connection handler gone, dropping event");
            return false;
        }
        true
    }

    /// Sends a copy of `event` to each of `targets`.
    pub fn broadcast(&self, targets: &[ConnectionId], event: ServerEvent) {
        for &conn in targets {
            self.send_to(conn, event.clone());
        }
    }
}

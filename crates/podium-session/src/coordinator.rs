//! The session coordinator: the single owner of all lobby state.
//!
//! Every inbound event and every disconnect goes through one
//! [`SessionCoordinator`], one at a time. Handling an event means mutating
//! the directory and then pushing notifications through the
//! [`ConnectionRegistry`]; nothing is awaited in between, so no two
//! mutations ever interleave.
//!
//! # Connection lifecycle
//!
//! ```text
//! connect() ──→ [Unjoined] ── join-game ──→ [Joined] ── leave-lobby ──→ [Unjoined]
//!                    │                          │
//!                    └──────── disconnect() ────┴──→ (gone)
//! ```
//!
//! Rejections never change state. They are reported to the offending
//! connection alone as an `error` notification.

use std::time::Duration;

use podium_lobby::{
    Lobby, LobbyConfig, LobbyDirectory, LobbyError, Player, StartRejection,
    TurnOutcome, settle_departure, submit_outcome,
};
use podium_protocol::{ClientEvent, ConnectionId, LobbyId, ServerEvent};

use crate::{ConnectionRegistry, ConnectionSender};

/// Message sent to a player whose turn timer ran out.
pub const TURN_TIMED_OUT: &str = "turn timed out";

/// A turn began in a lobby with a turn timeout.
///
/// The server arms a timer for `timeout` and, when it fires, hands
/// `lobby_id` and `turn_seq` back to [`SessionCoordinator::expire_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStarted {
    pub lobby_id: LobbyId,
    pub turn_seq: u64,
    pub timeout: Duration,
}

/// Owns the lobby directory and the connection registry.
#[derive(Debug)]
pub struct SessionCoordinator {
    directory: LobbyDirectory,
    registry: ConnectionRegistry,
    turn_starts: Vec<TurnStarted>,
}

impl SessionCoordinator {
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            directory: LobbyDirectory::new(config),
            registry: ConnectionRegistry::new(),
            turn_starts: Vec::new(),
        }
    }

    pub fn directory(&self) -> &LobbyDirectory {
        &self.directory
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Registers a new connection. It starts out unjoined.
    pub fn connect(&mut self, conn: ConnectionId, sender: ConnectionSender) {
        if self.registry.insert(conn, sender).is_some() {
            tracing::warn!(%conn, "connection registered twice, route replaced");
        }
        tracing::debug!(%conn, connections = self.registry.len(), "connection registered");
    }

    /// Handles one decoded, validated client event.
    ///
    /// Rejections are sent back to `conn` as an `error` notification.
    pub fn handle_event(&mut self, conn: ConnectionId, event: ClientEvent) {
        let name = event.name();
        let result = match event {
            ClientEvent::JoinGame(display_name) => {
                self.join_game(conn, display_name)
            }
            ClientEvent::StartGame(lobby_id) => self.start_game(conn, lobby_id),
            ClientEvent::SubmitOutcome {
                lobby_id,
                outcome_value,
            } => self.submit_outcome(conn, lobby_id, outcome_value),
            ClientEvent::LeaveLobby => {
                self.leave(conn);
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::debug!(%conn, event = name, error = %err, "request rejected");
            self.registry.send_to(conn, ServerEvent::Error(err.to_string()));
        }
    }

    /// Places `conn` in a lobby and announces it.
    ///
    /// The joiner receives `lobby-joined`, everyone in the lobby (joiner
    /// included) receives `lobby-update`, and a joiner who became host
    /// also receives `host-assigned`.
    ///
    /// # Errors
    /// [`LobbyError::AlreadyInLobby`] if `conn` is already in a lobby.
    pub fn join_game(
        &mut self,
        conn: ConnectionId,
        display_name: String,
    ) -> Result<(), LobbyError> {
        let lobby = self.directory.join(conn, display_name)?;
        let lobby_id = lobby.id();
        let players = lobby.player_views();
        let members = lobby.connection_ids();
        let is_host = lobby.player(conn).is_some_and(Player::is_host);

        self.registry.send_to(
            conn,
            ServerEvent::LobbyJoined {
                lobby_id,
                player_id: conn,
                players: players.clone(),
            },
        );
        self.registry.broadcast(&members, ServerEvent::LobbyUpdate(players));
        if is_host {
            self.registry.send_to(conn, ServerEvent::HostAssigned);
        }
        Ok(())
    }

    /// Starts the match in `lobby_id` on behalf of `conn`.
    ///
    /// # Errors
    /// [`LobbyError::CannotStart`] if the lobby is unknown, already
    /// running, short of players, or `conn` is not its host.
    pub fn start_game(
        &mut self,
        conn: ConnectionId,
        lobby_id: LobbyId,
    ) -> Result<(), LobbyError> {
        let lobby = self
            .directory
            .get_mut(lobby_id)
            .ok_or(LobbyError::CannotStart(StartRejection::UnknownLobby))?;
        let current_player = lobby.start_game(conn)?;
        let members = lobby.connection_ids();
        let started = turn_started(lobby);

        self.registry.broadcast(&members, ServerEvent::GameStarting);
        self.registry
            .broadcast(&members, ServerEvent::GameStart { current_player });
        self.turn_starts.extend(started);
        Ok(())
    }

    /// Records `conn`'s outcome and announces the next turn or the end of
    /// the match.
    ///
    /// # Errors
    /// - [`LobbyError::GameNotInProgress`] if the lobby is unknown or idle.
    /// - [`LobbyError::NotYourTurn`] if `conn` doesn't hold the turn.
    pub fn submit_outcome(
        &mut self,
        conn: ConnectionId,
        lobby_id: LobbyId,
        value: i64,
    ) -> Result<(), LobbyError> {
        let lobby = self
            .directory
            .get_mut(lobby_id)
            .ok_or(LobbyError::GameNotInProgress)?;
        let outcome = submit_outcome(lobby, conn, value)?;
        let members = lobby.connection_ids();
        let started = turn_started(lobby);

        self.announce(&members, outcome);
        self.turn_starts.extend(started);
        Ok(())
    }

    /// Removes `conn` from its lobby. A no-op if it isn't in one.
    ///
    /// In order: a new host gets `host-assigned`, the remaining players
    /// get `lobby-update`, then a running match is repaired and the result
    /// broadcast. An emptied lobby is deleted without notifications.
    pub fn leave(&mut self, conn: ConnectionId) {
        let Some(lobby) = self.directory.find_by_connection_mut(conn) else {
            return;
        };
        let seq_before = lobby.turn_seq();
        let Some(departure) = lobby.remove_player(conn) else {
            return;
        };
        let lobby_id = lobby.id();

        if lobby.is_empty() {
            if let Err(err) = self.directory.remove_lobby(lobby_id) {
                tracing::warn!(%lobby_id, error = %err, "failed to remove empty lobby");
            }
            return;
        }

        let members = lobby.connection_ids();
        let players = lobby.player_views();
        let outcome = settle_departure(lobby, departure.index);
        let started = if lobby.turn_seq() != seq_before {
            turn_started(lobby)
        } else {
            None
        };

        if let Some(new_host) = departure.new_host {
            tracing::info!(%lobby_id, conn = %new_host, "host reassigned");
            self.registry.send_to(new_host, ServerEvent::HostAssigned);
        }
        self.registry.broadcast(&members, ServerEvent::LobbyUpdate(players));
        if let Some(outcome) = outcome {
            self.announce(&members, outcome);
        }
        self.turn_starts.extend(started);
    }

    /// Forgets `conn` entirely: leaves its lobby and drops its route.
    /// Safe to call more than once.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.leave(conn);
        if self.registry.remove(conn).is_some() {
            tracing::debug!(%conn, connections = self.registry.len(), "connection unregistered");
        }
    }

    /// Called when a turn timer fires.
    ///
    /// Ignored unless the same turn is still pending. Otherwise the turn
    /// holder is told `"turn timed out"` and removed from the lobby as if
    /// they had disconnected. Their connection stays open, so they may
    /// join again.
    pub fn expire_turn(&mut self, lobby_id: LobbyId, turn_seq: u64) {
        let Some(lobby) = self.directory.get(lobby_id) else {
            return;
        };
        if !lobby.in_progress() || lobby.turn_seq() != turn_seq {
            tracing::trace!(%lobby_id, turn_seq, "stale turn timer");
            return;
        }
        let Some(conn) = lobby.current_player().map(Player::connection_id) else {
            return;
        };

        tracing::info!(%lobby_id, %conn, round = lobby.current_round(), "turn timed out");
        self.registry
            .send_to(conn, ServerEvent::Error(TURN_TIMED_OUT.to_owned()));
        self.leave(conn);
    }

    /// Drains the turns started since the last call.
    ///
    /// Only lobbies with a configured turn timeout produce entries.
    pub fn take_turn_starts(&mut self) -> Vec<TurnStarted> {
        std::mem::take(&mut self.turn_starts)
    }

    fn announce(&self, members: &[ConnectionId], outcome: TurnOutcome) {
        self.registry.broadcast(members, outcome.into());
    }
}

fn turn_started(lobby: &Lobby) -> Option<TurnStarted> {
    let timeout = lobby.config().turn_timeout?;
    if !lobby.in_progress() {
        return None;
    }
    Some(TurnStarted {
        lobby_id: lobby.id(),
        turn_seq: lobby.turn_seq(),
        timeout,
    })
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn connect(
        coordinator: &mut SessionCoordinator,
        n: u64,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        coordinator.connect(conn(n), tx);
        rx
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_rejection_goes_to_sender_only() {
        let mut coordinator = SessionCoordinator::new(LobbyConfig::default());
        let mut rx1 = connect(&mut coordinator, 1);
        let mut rx2 = connect(&mut coordinator, 2);
        coordinator.handle_event(conn(1), ClientEvent::JoinGame("A".into()));
        coordinator.handle_event(conn(2), ClientEvent::JoinGame("B".into()));
        drain(&mut rx1);
        drain(&mut rx2);

        coordinator.handle_event(conn(2), ClientEvent::JoinGame("B".into()));
        assert_eq!(
            drain(&mut rx2),
            vec![ServerEvent::Error("You are already in a lobby".into())]
        );
        assert!(drain(&mut rx1).is_empty());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut coordinator = SessionCoordinator::new(LobbyConfig::default());
        let _rx = connect(&mut coordinator, 1);
        coordinator.handle_event(conn(1), ClientEvent::JoinGame("A".into()));
        coordinator.disconnect(conn(1));
        coordinator.disconnect(conn(1));
        assert!(coordinator.directory().is_empty());
        assert!(coordinator.registry().is_empty());
    }

    #[test]
    fn test_no_turn_starts_without_timeout() {
        let mut coordinator = SessionCoordinator::new(LobbyConfig::default());
        let _rx1 = connect(&mut coordinator, 1);
        let _rx2 = connect(&mut coordinator, 2);
        coordinator.handle_event(conn(1), ClientEvent::JoinGame("A".into()));
        coordinator.handle_event(conn(2), ClientEvent::JoinGame("B".into()));
        coordinator.handle_event(conn(1), ClientEvent::StartGame(LobbyId(1)));
        assert!(coordinator.take_turn_starts().is_empty());
    }
}

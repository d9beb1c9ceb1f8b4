//! The lobby aggregate: membership, host designation, and match start.
//!
//! Turn order and scoring live in [`turn`](crate::turn); this module only
//! decides who is in the lobby and whether a match may begin.

use podium_protocol::{ConnectionId, LobbyId, PlayerView, ScoreEntry};

use crate::{LobbyConfig, LobbyError, LobbyStatus, Player, StartRejection};

/// What [`Lobby::remove_player`] reports about a departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The removed player, as it was at the moment of removal.
    pub player: Player,
    /// The position the player held in turn order.
    pub index: usize,
    /// Set when the host left and someone else inherited the role.
    pub new_host: Option<ConnectionId>,
}

/// One lobby: an ordered list of players plus match state.
///
/// `players` is in join order, which is also turn order. The host is
/// always `players[0]`.
#[derive(Debug, Clone)]
pub struct Lobby {
    pub(crate) id: LobbyId,
    pub(crate) config: LobbyConfig,
    pub(crate) players: Vec<Player>,
    pub(crate) status: LobbyStatus,
    pub(crate) current_player_index: usize,
    /// Bumped every time the turn changes hands (or the same player starts
    /// a fresh turn). Lets a stale turn timer recognise itself.
    pub(crate) turn_seq: u64,
}

impl Lobby {
    pub fn new(id: LobbyId, config: LobbyConfig) -> Self {
        Self {
            id,
            config,
            players: Vec::new(),
            status: LobbyStatus::Forming,
            current_player_index: 0,
            turn_seq: 0,
        }
    }

    pub fn id(&self) -> LobbyId {
        self.id
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn status(&self) -> LobbyStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn in_progress(&self) -> bool {
        self.status.is_in_progress()
    }

    pub fn current_round(&self) -> u32 {
        self.status.round()
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn turn_seq(&self) -> u64 {
        self.turn_seq
    }

    /// A lobby accepts players while it has room and no match is running.
    /// A finished lobby is joinable again.
    pub fn is_joinable(&self) -> bool {
        self.players.len() < self.config.capacity && !self.in_progress()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.position(conn).is_some()
    }

    /// Index of `conn` in turn order.
    pub fn position(&self, conn: ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.connection_id == conn)
    }

    pub fn player(&self, conn: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection_id == conn)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    /// The player holding the turn, or `None` outside a match.
    pub fn current_player(&self) -> Option<&Player> {
        if !self.in_progress() {
            return None;
        }
        self.players.get(self.current_player_index)
    }

    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    /// Score snapshot in turn order.
    pub fn scores(&self) -> Vec<ScoreEntry> {
        self.players.iter().map(Player::score_entry).collect()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection_id).collect()
    }

    /// Appends a player. The first player in an empty lobby becomes host.
    ///
    /// # Errors
    /// - [`LobbyError::AlreadyInLobby`] if `conn` is already a member.
    /// - [`LobbyError::LobbyUnavailable`] if the lobby is full or running
    ///   a match.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        display_name: impl Into<String>,
    ) -> Result<&Player, LobbyError> {
        if self.contains(conn) {
            return Err(LobbyError::AlreadyInLobby);
        }
        if !self.is_joinable() {
            return Err(LobbyError::LobbyUnavailable(self.id));
        }

        let is_host = self.players.is_empty();
        self.players.push(Player::new(conn, display_name, is_host));
        let index = self.players.len() - 1;
        let player = &self.players[index];

        tracing::info!(
            lobby_id = %self.id,
            conn = %conn,
            name = %player.display_name,
            is_host,
            players = index + 1,
            "player joined"
        );
        Ok(player)
    }

    /// Starts a match on behalf of `requester`.
    ///
    /// Coming from `Finished`, every score resets to 0 first. On success the
    /// round is 1, the turn belongs to `players[0]`, and its connection id
    /// is returned.
    ///
    /// # Errors
    /// [`LobbyError::CannotStart`] if a match is running, the requester is
    /// not the host, or there are too few players.
    pub fn start_game(
        &mut self,
        requester: ConnectionId,
    ) -> Result<ConnectionId, LobbyError> {
        if self.in_progress() {
            return Err(LobbyError::CannotStart(StartRejection::AlreadyRunning));
        }
        if self.host().map(|p| p.connection_id) != Some(requester) {
            return Err(LobbyError::CannotStart(StartRejection::NotHost));
        }
        if self.players.len() < self.config.min_players {
            return Err(LobbyError::CannotStart(
                StartRejection::NotEnoughPlayers {
                    have: self.players.len(),
                    need: self.config.min_players,
                },
            ));
        }

        if matches!(self.status, LobbyStatus::Finished { .. }) {
            for player in &mut self.players {
                player.score = 0;
            }
        }

        self.transition(LobbyStatus::InProgress { round: 1 });
        self.current_player_index = 0;
        self.turn_seq += 1;

        tracing::info!(
            lobby_id = %self.id,
            players = self.players.len(),
            rounds = self.config.round_limit,
            "match started"
        );
        Ok(requester)
    }

    /// Removes `conn` from the lobby, reassigning host if needed.
    ///
    /// Returns `None` if `conn` isn't a member. Outside a match the turn
    /// pointer is clamped back into range here; during a match the caller
    /// must run [`settle_departure`](crate::settle_departure) next.
    pub fn remove_player(&mut self, conn: ConnectionId) -> Option<Departure> {
        let index = self.position(conn)?;
        let player = self.players.remove(index);

        let new_host = match self.players.first_mut() {
            Some(first) if !first.is_host => {
                first.is_host = true;
                Some(first.connection_id)
            }
            _ => None,
        };

        if !self.in_progress() && self.current_player_index >= self.players.len() {
            self.current_player_index = 0;
        }

        tracing::info!(
            lobby_id = %self.id,
            conn = %conn,
            index,
            remaining = self.players.len(),
            new_host = ?new_host,
            "player left"
        );
        Some(Departure {
            player,
            index,
            new_host,
        })
    }

    pub(crate) fn transition(&mut self, next: LobbyStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal lobby transition {} -> {}",
            self.status,
            next
        );
        self.status = next;
    }
}

//! Lobby directory: creates, tracks, and places players into lobbies.

use podium_protocol::{ConnectionId, LobbyId};

use crate::{Lobby, LobbyConfig, LobbyError};

/// All live lobbies, in creation order.
///
/// Placement is first-fit: a joiner lands in the oldest lobby that still
/// accepts players, and a fresh lobby is created only when none does. A
/// connection belongs to at most one lobby at a time.
#[derive(Debug)]
pub struct LobbyDirectory {
    config: LobbyConfig,
    lobbies: Vec<Lobby>,
    next_id: u64,
}

impl LobbyDirectory {
    /// Creates an empty directory. `config` is validated and applied to
    /// every lobby the directory creates.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            config: config.validated(),
            lobbies: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lobby> {
        self.lobbies.iter()
    }

    /// The oldest lobby that accepts players.
    pub fn find_joinable(&self) -> Option<&Lobby> {
        self.find_joinable_index().map(|i| &self.lobbies[i])
    }

    fn find_joinable_index(&self) -> Option<usize> {
        self.lobbies.iter().position(Lobby::is_joinable)
    }

    /// Creates an empty lobby with a never-reused id.
    pub fn create_lobby(&mut self) -> &mut Lobby {
        let id = LobbyId(self.next_id);
        self.next_id += 1;
        self.lobbies.push(Lobby::new(id, self.config.clone()));
        tracing::info!(lobby_id = %id, "lobby created");

        let last = self.lobbies.len() - 1;
        &mut self.lobbies[last]
    }

    pub fn get(&self, id: LobbyId) -> Option<&Lobby> {
        self.lobbies.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LobbyId) -> Option<&mut Lobby> {
        self.lobbies.iter_mut().find(|l| l.id == id)
    }

    /// The lobby `conn` currently belongs to.
    pub fn find_by_connection(&self, conn: ConnectionId) -> Option<&Lobby> {
        self.lobbies.iter().find(|l| l.contains(conn))
    }

    pub fn find_by_connection_mut(
        &mut self,
        conn: ConnectionId,
    ) -> Option<&mut Lobby> {
        self.lobbies.iter_mut().find(|l| l.contains(conn))
    }

    /// Places `conn` in the first joinable lobby, creating one if needed.
    ///
    /// # Errors
    /// [`LobbyError::AlreadyInLobby`] if `conn` is already placed.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        display_name: impl Into<String>,
    ) -> Result<&Lobby, LobbyError> {
        if self.find_by_connection(conn).is_some() {
            return Err(LobbyError::AlreadyInLobby);
        }

        let index = match self.find_joinable_index() {
            Some(index) => index,
            None => {
                self.create_lobby();
                self.lobbies.len() - 1
            }
        };
        let lobby = &mut self.lobbies[index];
        lobby.join(conn, display_name)?;
        Ok(lobby)
    }

    /// Drops an empty lobby.
    ///
    /// # Errors
    /// - [`LobbyError::NotFound`] if no lobby has this id.
    /// - [`LobbyError::NotEmpty`] if players remain.
    pub fn remove_lobby(&mut self, id: LobbyId) -> Result<Lobby, LobbyError> {
        let index = self
            .lobbies
            .iter()
            .position(|l| l.id == id)
            .ok_or(LobbyError::NotFound(id))?;
        if !self.lobbies[index].is_empty() {
            return Err(LobbyError::NotEmpty(id));
        }

        let lobby = self.lobbies.remove(index);
        tracing::info!(lobby_id = %id, "lobby removed");
        Ok(lobby)
    }
}

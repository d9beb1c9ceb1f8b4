//! A lobby member and the views sent about them.

use podium_protocol::{ConnectionId, PlayerView, ScoreEntry, WinnerView};

/// A participant in a lobby, keyed by its connection.
///
/// Only the lobby and the turn engine mutate a player; everything outside
/// this crate sees it through the getters and the wire views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) connection_id: ConnectionId,
    pub(crate) display_name: String,
    pub(crate) score: i64,
    pub(crate) is_host: bool,
}

impl Player {
    pub(crate) fn new(
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        is_host: bool,
    ) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            score: 0,
            is_host,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.connection_id,
            name: self.display_name.clone(),
            score: self.score,
            is_host: self.is_host,
        }
    }

    pub fn score_entry(&self) -> ScoreEntry {
        ScoreEntry {
            id: self.connection_id,
            name: self.display_name.clone(),
            score: self.score,
        }
    }

    pub(crate) fn winner_view(&self) -> WinnerView {
        WinnerView {
            id: self.connection_id,
            name: self.display_name.clone(),
        }
    }
}

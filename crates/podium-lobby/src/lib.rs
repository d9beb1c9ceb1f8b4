//! Lobby placement, membership, and the turn engine for Podium.
//!
//! Everything in this crate is synchronous and owns no I/O. The session
//! layer drives it from a single task and turns the results into
//! notifications.
//!
//! # Key types
//!
//! - [`LobbyDirectory`]: first-fit placement of players into lobbies
//! - [`Lobby`]: membership, host designation, match start
//! - [`LobbyStatus`]: lifecycle state machine
//! - [`LobbyConfig`]: capacity, round limit, departure policy, turn timeout
//! - [`submit_outcome`], [`advance_turn`], [`end_game`],
//!   [`settle_departure`]: the turn engine

mod config;
mod directory;
mod error;
mod lobby;
mod player;
mod turn;

pub use config::{DeparturePolicy, LobbyConfig, LobbyStatus, MIN_ACTIVE_PLAYERS};
pub use directory::LobbyDirectory;
pub use error::{LobbyError, StartRejection};
pub use lobby::{Departure, Lobby};
pub use player::Player;
pub use turn::{
    GameSummary, TurnOutcome, advance_turn, end_game, settle_departure,
    submit_outcome,
};

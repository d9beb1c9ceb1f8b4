//! Turn engine: scoring, rotation, rounds, and match end.
//!
//! Every function here takes the lobby by `&mut` and reports what clients
//! need to hear as a [`TurnOutcome`]. Nothing in this module sends
//! anything; the session layer turns outcomes into broadcasts.
//!
//! Rotation rules:
//! - After a submission the turn passes to the next player in join order.
//! - Wrapping back to index 0 completes a round.
//! - Completing round `round_limit` ends the match.
//! - Fewer than [`MIN_ACTIVE_PLAYERS`] players ends the match at once.

use std::cmp::Ordering;

use podium_protocol::{ConnectionId, ScoreEntry, ServerEvent, WinnerView};

use crate::{
    DeparturePolicy, Lobby, LobbyError, LobbyStatus, MIN_ACTIVE_PLAYERS,
    Player,
};

/// Final standings of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub winner: WinnerView,
    pub scores: Vec<ScoreEntry>,
}

/// What a turn change produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The match continues with `current_player` on turn.
    Next {
        current_player: ConnectionId,
        scores: Vec<ScoreEntry>,
        round: u32,
    },
    /// The match ended.
    GameOver(GameSummary),
}

impl From<TurnOutcome> for ServerEvent {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Next {
                current_player,
                scores,
                round,
            } => ServerEvent::NextTurn {
                current_player,
                scores,
                round,
            },
            TurnOutcome::GameOver(GameSummary { winner, scores }) => {
                ServerEvent::GameOver { winner, scores }
            }
        }
    }
}

/// Records `value` for the player holding the turn and advances.
///
/// Scores saturate at the `i64` bounds.
///
/// # Errors
/// - [`LobbyError::GameNotInProgress`] if no match is running.
/// - [`LobbyError::NotYourTurn`] if `conn` doesn't hold the turn.
pub fn submit_outcome(
    lobby: &mut Lobby,
    conn: ConnectionId,
    value: i64,
) -> Result<TurnOutcome, LobbyError> {
    if !lobby.in_progress() {
        return Err(LobbyError::GameNotInProgress);
    }
    let index = lobby.current_player_index;
    let player = match lobby.players.get_mut(index) {
        Some(player) if player.connection_id == conn => player,
        _ => return Err(LobbyError::NotYourTurn),
    };
    player.score = player.score.saturating_add(value);

    tracing::debug!(
        lobby_id = %lobby.id,
        conn = %conn,
        value,
        total = player.score,
        "outcome recorded"
    );
    advance_turn(lobby).ok_or(LobbyError::GameNotInProgress)
}

/// Passes the turn to the next player, completing a round on wrap.
///
/// Returns `None` when there is no running match to advance.
pub fn advance_turn(lobby: &mut Lobby) -> Option<TurnOutcome> {
    if !lobby.in_progress() || lobby.players.is_empty() {
        return None;
    }
    lobby.current_player_index =
        (lobby.current_player_index + 1) % lobby.players.len();

    if lobby.current_player_index == 0 {
        complete_rotation(lobby)
    } else {
        lobby.turn_seq += 1;
        next_turn(lobby)
    }
}

/// Ends the running match and names the winner.
///
/// The winner is the highest score; on a tie, the player earliest in turn
/// order. Scores are left as they are so the final standings stay visible
/// until a rematch. Returns `None` if no match is running or nobody is
/// left to win.
pub fn end_game(lobby: &mut Lobby) -> Option<GameSummary> {
    let round = lobby.current_round();
    finish(lobby, round)
}

/// Repairs turn state after [`Lobby::remove_player`] took the player at
/// `departed_index` out of a running match.
///
/// Returns `None` when no match was running. Otherwise the outcome is
/// what the remaining players must be told.
pub fn settle_departure(
    lobby: &mut Lobby,
    departed_index: usize,
) -> Option<TurnOutcome> {
    if !lobby.in_progress() {
        return None;
    }
    if lobby.players.len() < MIN_ACTIVE_PLAYERS {
        if lobby.current_player_index >= lobby.players.len() {
            lobby.current_player_index = 0;
        }
        return end_game(lobby).map(TurnOutcome::GameOver);
    }

    match lobby.config.departure_policy {
        DeparturePolicy::RecomputeNext => recompute_turn(lobby, departed_index),
        DeparturePolicy::AdvanceTurn => advance_turn(lobby),
    }
}

fn recompute_turn(lobby: &mut Lobby, departed: usize) -> Option<TurnOutcome> {
    let current = lobby.current_player_index;
    match departed.cmp(&current) {
        // Everyone after the gap shifted down by one; follow the same player.
        Ordering::Less => {
            lobby.current_player_index = current - 1;
            next_turn(lobby)
        }
        Ordering::Greater => next_turn(lobby),
        // The turn holder left and their successor slid into the slot.
        Ordering::Equal if current < lobby.players.len() => {
            lobby.turn_seq += 1;
            next_turn(lobby)
        }
        // The turn holder was last in the rotation.
        Ordering::Equal => {
            lobby.current_player_index = 0;
            complete_rotation(lobby)
        }
    }
}

fn complete_rotation(lobby: &mut Lobby) -> Option<TurnOutcome> {
    let round = lobby.current_round() + 1;
    if round > lobby.config.round_limit {
        return finish(lobby, round).map(TurnOutcome::GameOver);
    }

    lobby.transition(LobbyStatus::InProgress { round });
    lobby.turn_seq += 1;
    tracing::debug!(lobby_id = %lobby.id, round, "round started");
    next_turn(lobby)
}

fn next_turn(lobby: &Lobby) -> Option<TurnOutcome> {
    let current = lobby.players.get(lobby.current_player_index)?;
    Some(TurnOutcome::Next {
        current_player: current.connection_id,
        scores: lobby.scores(),
        round: lobby.current_round(),
    })
}

fn finish(lobby: &mut Lobby, round: u32) -> Option<GameSummary> {
    if !lobby.in_progress() {
        return None;
    }
    lobby.transition(LobbyStatus::Finished { round });
    lobby.turn_seq += 1;

    let winner = leader(&lobby.players)?.winner_view();
    tracing::info!(
        lobby_id = %lobby.id,
        winner = %winner.name,
        round,
        "match finished"
    );
    Some(GameSummary {
        winner,
        scores: lobby.scores(),
    })
}

/// Highest score, earliest in turn order on a tie.
fn leader(players: &[Player]) -> Option<&Player> {
    let mut iter = players.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, p| if p.score > best.score { p } else { best }))
}

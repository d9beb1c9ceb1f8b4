// Scripted archery player for a Podium server.
//
// Joins a lobby, starts the match once enough players are seated (if it is
// the host), shoots a random ring on each of its turns, prints the final
// standings, and exits on game-over. Run several in parallel to watch a
// full match.
//
// Usage:
//   podium-bot [OPTIONS]
//     --url <URL>        Server URL (default: ws://127.0.0.1:3000)
//     --name <NAME>      Display name (default: bot)
//     --players <N>      Seated players before the host starts (default: 2)

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use podium_protocol::{
    ClientEnvelope, ClientEvent, ConnectionId, Envelope, LobbyId, ScoreEntry,
    ServerEnvelope, ServerEvent,
};
use rand::Rng;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing_subscriber::EnvFilter;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Points for each target ring, bullseye first. 0 is a miss.
const RING_SCORES: [i64; 6] = [10, 8, 6, 4, 2, 0];

/// Pause before each shot so a human can follow along.
const AIM_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, thiserror::Error)]
enum BotError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server closed the connection before the match ended")]
    Closed,
}

struct BotConfig {
    url: String,
    name: String,
    players: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3000".to_string(),
            name: "bot".to_string(),
            players: 2,
        }
    }
}

/// What the bot knows about its lobby.
#[derive(Default)]
struct Seat {
    me: Option<ConnectionId>,
    lobby: Option<LobbyId>,
    is_host: bool,
    seated: usize,
    started: bool,
}

impl Seat {
    fn should_start(&self, wanted: usize) -> bool {
        self.is_host && !self.started && self.seated >= wanted
    }

    fn is_me(&self, player: ConnectionId) -> bool {
        self.me == Some(player)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = parse_args();
    if let Err(e) = play(&config).await {
        eprintln!("{}: {e}", config.name);
        std::process::exit(1);
    }
}

async fn play(config: &BotConfig) -> Result<(), BotError> {
    let (mut ws, _) = tokio_tungstenite::connect_async(config.url.as_str()).await?;
    tracing::info!(url = %config.url, name = %config.name, "connected");

    let mut seq = 0;
    send(&mut ws, &mut seq, ClientEvent::JoinGame(config.name.clone())).await?;

    let mut seat = Seat::default();
    while let Some(msg) = ws.next().await {
        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let envelope: ServerEnvelope = serde_json::from_str(text.as_str())?;

        match envelope.payload {
            ServerEvent::LobbyJoined {
                lobby_id,
                player_id,
                players,
            } => {
                tracing::info!(%lobby_id, seated = players.len(), "joined lobby");
                seat.me = Some(player_id);
                seat.lobby = Some(lobby_id);
                seat.seated = players.len();
            }
            ServerEvent::LobbyUpdate(players) => {
                seat.seated = players.len();
            }
            ServerEvent::HostAssigned => {
                tracing::info!("we are the host");
                seat.is_host = true;
            }
            ServerEvent::GameStarting => {
                seat.started = true;
                tracing::info!("match starting");
            }
            ServerEvent::GameStart { current_player } => {
                if seat.is_me(current_player) {
                    shoot(&mut ws, &mut seq, &seat).await?;
                }
            }
            ServerEvent::NextTurn {
                current_player,
                round,
                ..
            } => {
                if seat.is_me(current_player) {
                    tracing::debug!(round, "our turn");
                    shoot(&mut ws, &mut seq, &seat).await?;
                }
            }
            ServerEvent::GameOver { winner, scores } => {
                print_standings(&winner.name, scores);
                ws.close(None).await?;
                return Ok(());
            }
            ServerEvent::Error(message) => {
                tracing::warn!(%message, "server rejected a request");
            }
        }

        if seat.should_start(config.players) {
            if let Some(lobby) = seat.lobby {
                seat.started = true;
                send(&mut ws, &mut seq, ClientEvent::StartGame(lobby)).await?;
            }
        }
    }

    Err(BotError::Closed)
}

async fn shoot(ws: &mut Ws, seq: &mut u64, seat: &Seat) -> Result<(), BotError> {
    let Some(lobby_id) = seat.lobby else {
        return Ok(());
    };
    tokio::time::sleep(AIM_DELAY).await;
    let ring = pick_ring();
    tracing::info!(ring, "shot");
    send(
        ws,
        seq,
        ClientEvent::SubmitOutcome {
            lobby_id,
            outcome_value: ring,
        },
    )
    .await
}

fn pick_ring() -> i64 {
    RING_SCORES[rand::rng().random_range(0..RING_SCORES.len())]
}

async fn send(ws: &mut Ws, seq: &mut u64, event: ClientEvent) -> Result<(), BotError> {
    *seq += 1;
    let envelope: ClientEnvelope = Envelope {
        seq: *seq,
        timestamp: 0,
        payload: event,
    };
    let frame = serde_json::to_string(&envelope)?;
    ws.send(Message::text(frame)).await?;
    Ok(())
}

fn print_standings(winner: &str, mut scores: Vec<ScoreEntry>) {
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    println!("Winner: {winner}");
    for (place, entry) in scores.iter().enumerate() {
        println!("  {}. {:<20} {:>4}", place + 1, entry.name, entry.score);
    }
}

/// Parse command-line arguments into a `BotConfig`. Uses simple
/// `std::env::args()` matching.
fn parse_args() -> BotConfig {
    let mut config = BotConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                i += 1;
                config.url = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--url requires a value");
                    std::process::exit(1);
                });
            }
            "--name" => {
                i += 1;
                config.name = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--name requires a value");
                    std::process::exit(1);
                });
            }
            "--players" => {
                i += 1;
                config.players = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|&n| n >= 2)
                    .unwrap_or_else(|| {
                        eprintln!("--players requires a number of at least 2");
                        std::process::exit(1);
                    });
            }
            "--help" | "-h" => {
                println!("Usage: podium-bot [--url URL] [--name NAME] [--players N]");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

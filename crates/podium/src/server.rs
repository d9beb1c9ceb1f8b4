//! `PodiumServer` builder, coordinator actor, and accept loop.
//!
//! This is the entry point for running a Podium server. It ties together
//! all the layers: transport → protocol → session → lobby.
//!
//! All lobby state lives in one [`SessionCoordinator`] owned by a single
//! actor task. Connection handlers never touch it directly; they send
//! [`Command`]s down a channel, so every event is handled to completion
//! before the next one starts.

use std::sync::Arc;
use std::time::Instant;

use podium_lobby::LobbyConfig;
use podium_protocol::{ClientEvent, Codec, ConnectionId, JsonCodec, LobbyId};
use podium_session::{ConnectionSender, SessionCoordinator, TurnStarted};
use podium_transport::{Handshake, Transport, WebSocketTransport};
use tokio::sync::mpsc;

use crate::PodiumError;
use crate::handler::handle_connection;

/// Capacity of the coordinator's command channel.
const COMMAND_CHANNEL_SIZE: usize = 256;

/// Work items for the coordinator actor.
#[derive(Debug)]
pub(crate) enum Command {
    /// A socket was accepted. Its notifications go to `sender`.
    Connect {
        conn: ConnectionId,
        sender: ConnectionSender,
    },

    /// A decoded, validated client event.
    Event {
        conn: ConnectionId,
        event: ClientEvent,
    },

    /// The socket closed or its handler exited.
    Disconnect { conn: ConnectionId },

    /// A turn timer fired.
    TurnExpired { lobby_id: LobbyId, turn_seq: u64 },
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) codec: C,
    pub(crate) started: Instant,
}

impl<C: Codec> ServerState<C> {
    /// Milliseconds since the server started, for envelope timestamps.
    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// The task that owns the [`SessionCoordinator`].
struct CoordinatorActor {
    coordinator: SessionCoordinator,
    commands: mpsc::Receiver<Command>,
    /// Lets turn timers report back without keeping the channel open.
    loopback: mpsc::WeakSender<Command>,
}

impl CoordinatorActor {
    async fn run(mut self) {
        tracing::info!("coordinator started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Connect { conn, sender } => {
                    self.coordinator.connect(conn, sender);
                }
                Command::Event { conn, event } => {
                    tracing::trace!(%conn, event = event.name(), "event");
                    self.coordinator.handle_event(conn, event);
                }
                Command::Disconnect { conn } => {
                    self.coordinator.disconnect(conn);
                }
                Command::TurnExpired { lobby_id, turn_seq } => {
                    self.coordinator.expire_turn(lobby_id, turn_seq);
                }
            }

            for turn in self.coordinator.take_turn_starts() {
                self.arm_turn_timer(turn);
            }
        }

        tracing::info!("coordinator stopped");
    }

    fn arm_turn_timer(&self, turn: TurnStarted) {
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            tokio::time::sleep(turn.timeout).await;
            let Some(commands) = loopback.upgrade() else {
                return;
            };
            let _ = commands
                .send(Command::TurnExpired {
                    lobby_id: turn.lobby_id,
                    turn_seq: turn.turn_seq,
                })
                .await;
        });
    }
}

/// Builder for configuring and starting a Podium server.
///
/// # Example
///
/// ```rust,no_run
/// use podium::prelude::*;
///
/// # async fn run() -> Result<(), PodiumError> {
/// let server = PodiumServer::builder()
///     .bind("0.0.0.0:3000")
///     .lobby_config(LobbyConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PodiumServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
}

impl PodiumServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the rules every lobby is created with.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<PodiumServer<JsonCodec>, PodiumError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let (commands, receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let actor = CoordinatorActor {
            coordinator: SessionCoordinator::new(self.lobby_config),
            commands: receiver,
            loopback: commands.downgrade(),
        };
        let state = Arc::new(ServerState {
            commands,
            codec: JsonCodec,
            started: Instant::now(),
        });

        Ok(PodiumServer {
            transport,
            state,
            actor,
        })
    }
}

impl Default for PodiumServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Podium server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PodiumServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    actor: CoordinatorActor,
}

impl PodiumServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> PodiumServerBuilder {
        PodiumServerBuilder::new()
    }
}

impl<C: Codec> PodiumServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Starts the coordinator and runs the accept loop.
    ///
    /// Spawns a task per accepted socket that completes the WebSocket
    /// handshake and then runs the handler. Runs until the process is
    /// terminated.
    pub async fn run(self) -> Result<(), PodiumError> {
        let Self {
            mut transport,
            state,
            actor,
        } = self;
        tokio::spawn(actor.run());
        tracing::info!(addr = ?transport.local_addr().ok(), "Podium server running");

        loop {
            match transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let addr = pending.peer_addr();
                        let conn = match pending.handshake().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%addr, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

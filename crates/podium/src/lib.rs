//! # Podium
//!
//! Turn-based multiplayer lobby server for small party games.
//!
//! Players connect over WebSocket, get placed into the first lobby with a
//! free seat, and take turns submitting a numeric outcome. After a fixed
//! number of rounds the highest score wins.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use podium::prelude::*;
//!
//! # async fn run() -> Result<(), PodiumError> {
//! let server = PodiumServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_BIND_HOST, DEFAULT_PORT, ServerConfig};
pub use error::PodiumError;
pub use server::{PodiumServer, PodiumServerBuilder};

/// Everything needed to embed a server.
pub mod prelude {
    pub use crate::{PodiumError, PodiumServer, PodiumServerBuilder, ServerConfig};
    pub use podium_lobby::{DeparturePolicy, LobbyConfig};
    pub use podium_protocol::{ClientEvent, ServerEvent};
}

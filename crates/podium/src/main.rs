use podium::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PodiumError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        capacity = config.lobby.capacity,
        round_limit = config.lobby.round_limit,
        turn_timeout = ?config.lobby.turn_timeout,
        departure_policy = ?config.lobby.departure_policy,
        "loaded configuration"
    );

    let addr = config.bind_addr();
    let server = PodiumServer::builder()
        .bind(&addr)
        .lobby_config(config.lobby)
        .build()
        .await?;
    tracing::info!(%addr, "listening");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

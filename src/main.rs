use anyhow::{Context, Result};
use minesweeper_server::{config::ServerConfig, logging, server::Server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    info!("🚀 Starting Minesweeper multiplayer server");

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let board = config.load_board().context("failed to create the board")?;

    info!(
        "📊 Board ready: {} columns by {} rows, debug mode {}",
        board.width,
        board.height,
        if config.debug { "on" } else { "off" }
    );

    let server = Server::bind(config.bind_addr(), board, config.debug)
        .await
        .with_context(|| format!("failed to listen on {}", config.bind_addr()))?;

    info!("🌐 Accepting players on {}", server.local_addr()?);
    server.run().await.context("accept loop failed")?;

    Ok(())
}

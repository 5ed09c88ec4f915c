use std::net::SocketAddr;

use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info};

use crate::{
    connection::handle_connection,
    data::Board,
    logic::{Game, SharedGame},
};

/// Accepts players and hands each one to its own task. All tasks share a
/// single [`Game`] behind one lock.
pub struct Server {
    listener: TcpListener,
    game: SharedGame,
    debug: bool,
}

impl Server {
    pub async fn bind<A: ToSocketAddrs>(addr: A, board: Board, debug: bool) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            game: Game::shared(board),
            debug,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn game(&self) -> SharedGame {
        self.game.clone()
    }

    /// Runs the accept loop. Only returns if the listening socket itself
    /// fails; errors on individual connections never stop it.
    pub async fn run(self) -> std::io::Result<()> {
        info!(
            "Listening on {} (debug mode: {})",
            self.local_addr()?,
            self.debug
        );

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) if is_connection_error(&e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let game = self.game.clone();
            let debug = self.debug;
            tokio::spawn(async move {
                handle_connection(game, stream, peer, debug).await;
            });
        }
    }
}

/// Accept errors that concern one half-open client rather than the listener.
fn is_connection_error(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        e.kind(),
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset
    )
}

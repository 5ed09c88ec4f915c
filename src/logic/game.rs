use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::{
    data::Board,
    logic::DigOutcome,
    protocol::{Command, Reply, hello_message},
};

/// The one lock every connection goes through. Holding it gives exclusive
/// access to both the board and the player count.
pub type SharedGame = Arc<Mutex<Game>>;

#[derive(Debug)]
pub struct Game {
    board: Board,
    players: usize,
}

impl Game {
    #[instrument(level = "trace", skip(board))]
    pub fn new(board: Board) -> Self {
        info!(
            "Creating new game: {}x{} with {} bombs",
            board.width,
            board.height,
            board.bombs()
        );
        Self { board, players: 0 }
    }

    pub fn shared(board: Board) -> SharedGame {
        Arc::new(Mutex::new(Self::new(board)))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> usize {
        self.players
    }

    /// Counts a new player and returns the HELLO line they should be sent.
    pub fn join(&mut self) -> String {
        self.players += 1;
        info!("Player joined, total players: {}", self.players);
        hello_message(self.players, self.board.width, self.board.height)
    }

    pub fn leave(&mut self) {
        self.players = self.players.saturating_sub(1);
        info!("Player left, remaining players: {}", self.players);
    }

    /// Runs one command to completion, rendering the reply before the
    /// caller gets a chance to release the lock.
    #[instrument(level = "trace", skip(self))]
    pub fn execute(&mut self, command: Command) -> Reply {
        debug!("Executing {:?}", command);
        match command {
            Command::Look => Reply::Board(self.board.look()),
            Command::Help => Reply::Help,
            Command::Bye => Reply::Bye,
            Command::Dig { x, y } => match self.board.dig(x, y) {
                DigOutcome::Boom => Reply::Boom,
                DigOutcome::Board(rendering) => Reply::Board(rendering),
            },
            Command::Flag { x, y } => Reply::Board(self.board.flag(x, y)),
            Command::Deflag { x, y } => Reply::Board(self.board.deflag(x, y)),
        }
    }
}

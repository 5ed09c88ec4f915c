//! Multiplayer Minesweeper over a line-based TCP protocol.
//!
//! One [`data::Board`] is shared by every connected player. Each connection
//! runs in its own task, and every command goes through the single lock in
//! [`logic::SharedGame`], so commands from different players never
//! interleave.

pub mod board_file;
pub mod config;
pub mod connection;
pub mod data;
pub mod error;
pub mod logging;
pub mod logic;
pub mod protocol;
pub mod server;

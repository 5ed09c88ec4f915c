use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use tracing::info;

use crate::{board_file::load_board_file, data::Board, error::ConfigError};

pub const DEFAULT_PORT: u16 = 4444;
pub const DEFAULT_SIZE: usize = 10;

const HOST_VAR: &str = "MINESWEEPER_HOST";
const PORT_VAR: &str = "MINESWEEPER_PORT";
const DEBUG_VAR: &str = "MINESWEEPER_DEBUG";
const SIZE_VAR: &str = "MINESWEEPER_SIZE";
const BOARD_FILE_VAR: &str = "MINESWEEPER_BOARD_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSource {
    Random { width: usize, height: usize },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// When set, digging a bomb does not disconnect the player.
    pub debug: bool,
    pub board: BoardSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            debug: false,
            board: BoardSource::Random {
                width: DEFAULT_SIZE,
                height: DEFAULT_SIZE,
            },
        }
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidVar {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value, "expected true or false")),
    }
}

fn parse_size(value: &str) -> Result<(usize, usize), ConfigError> {
    let reason = "expected WIDTH,HEIGHT with both at least 1";
    let (width, height) = value
        .split_once(',')
        .ok_or_else(|| invalid(SIZE_VAR, value, reason))?;

    let width: usize = width
        .trim()
        .parse()
        .map_err(|_| invalid(SIZE_VAR, value, reason))?;
    let height: usize = height
        .trim()
        .parse()
        .map_err(|_| invalid(SIZE_VAR, value, reason))?;

    if width == 0 || height == 0 {
        return Err(invalid(SIZE_VAR, value, reason));
    }
    Ok((width, height))
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source, falling back to
    /// defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(HOST_VAR) {
            config.host = value
                .trim()
                .parse()
                .map_err(|_| invalid(HOST_VAR, &value, "not an IP address"))?;
        }

        if let Some(value) = lookup(PORT_VAR) {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| invalid(PORT_VAR, &value, "expected a port between 0 and 65535"))?;
        }

        if let Some(value) = lookup(DEBUG_VAR) {
            config.debug = parse_bool(DEBUG_VAR, &value)?;
        }

        config.board = match (lookup(SIZE_VAR), lookup(BOARD_FILE_VAR)) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingBoardSource),
            (Some(size), None) => {
                let (width, height) = parse_size(&size)?;
                BoardSource::Random { width, height }
            }
            (None, Some(path)) => BoardSource::File(PathBuf::from(path)),
            (None, None) => config.board,
        };

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn load_board(&self) -> Result<Board, ConfigError> {
        match &self.board {
            BoardSource::Random { width, height } => {
                let board = Board::random(*width, *height)?;
                info!(
                    "Generated random {}x{} board with {} bombs",
                    width,
                    height,
                    board.bombs()
                );
                Ok(board)
            }
            BoardSource::File(path) => load_board_file(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::BoardError;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr().port(), 4444);
        assert!(!config.debug);
        assert_eq!(
            config.board,
            BoardSource::Random {
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn test_reads_every_variable() {
        let config = config_from(&[
            ("MINESWEEPER_HOST", "127.0.0.1"),
            ("MINESWEEPER_PORT", "0"),
            ("MINESWEEPER_DEBUG", "TRUE"),
            ("MINESWEEPER_SIZE", "42,58"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:0".parse::<SocketAddr>().unwrap());
        assert!(config.debug);
        assert_eq!(
            config.board,
            BoardSource::Random {
                width: 42,
                height: 58
            }
        );

        let config = config_from(&[("MINESWEEPER_BOARD_FILE", "boards/small.txt")]).unwrap();
        assert_eq!(config.board, BoardSource::File("boards/small.txt".into()));
    }

    #[test]
    fn test_rejects_invalid_values() {
        for (name, value) in [
            ("MINESWEEPER_PORT", "65536"),
            ("MINESWEEPER_PORT", "-1"),
            ("MINESWEEPER_HOST", "localhost:1"),
            ("MINESWEEPER_DEBUG", "maybe"),
            ("MINESWEEPER_SIZE", "10"),
            ("MINESWEEPER_SIZE", "0,5"),
            ("MINESWEEPER_SIZE", "5,x"),
        ] {
            assert!(
                matches!(config_from(&[(name, value)]), Err(ConfigError::InvalidVar { .. })),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_and_file_conflict() {
        assert!(matches!(
            config_from(&[
                ("MINESWEEPER_SIZE", "3,3"),
                ("MINESWEEPER_BOARD_FILE", "board.txt")
            ]),
            Err(ConfigError::ConflictingBoardSource)
        ));
    }

    #[test]
    fn test_overflowing_size_fails_to_load() {
        let huge = 1usize << (usize::BITS / 2);
        let size = format!("{huge},{huge}");
        let config = config_from(&[("MINESWEEPER_SIZE", size.as_str())]).unwrap();
        assert!(matches!(
            config.load_board(),
            Err(ConfigError::Board(BoardError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_load_random_board() {
        let board = config_from(&[("MINESWEEPER_SIZE", "4,3")])
            .unwrap()
            .load_board()
            .unwrap();
        assert_eq!((board.width, board.height), (4, 3));
        assert_eq!(board.look(), "- - - -\n- - - -\n- - - -");
    }
}

//! Error types for the minesweeper server

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("board of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },

    #[error("expected {expected} cells for the board, got {got}")]
    CellCount { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("board file is empty")]
    MissingHeader,

    #[error("line 1: expected \"X Y\", got {0:?}")]
    InvalidHeader(String),

    #[error("line {line}: expected space-separated 0/1 values, got {content:?}")]
    InvalidRow { line: usize, content: String },

    #[error("line {line}: expected {expected} values, got {got}")]
    RowWidth {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("expected {expected} rows, got {got}")]
    RowCount { expected: usize, got: usize },

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("MINESWEEPER_SIZE and MINESWEEPER_BOARD_FILE may not be set together")]
    ConflictingBoardSource,

    #[error("failed to read board file {path}: {source}")]
    ReadBoardFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid board file {path}: {source}")]
    BoardFile {
        path: PathBuf,
        #[source]
        source: BoardFileError,
    },

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unrecognized command: {0:?}")]
    UnrecognizedCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_display() {
        let err = BoardError::CellCount {
            expected: 6,
            got: 5,
        };
        assert_eq!(err.to_string(), "expected 6 cells for the board, got 5");
    }

    #[test]
    fn test_too_large_display() {
        let err = BoardError::TooLarge {
            width: usize::MAX,
            height: 2,
        };
        assert_eq!(
            err.to_string(),
            format!("board of {}x2 cells is too large", usize::MAX)
        );
    }

    #[test]
    fn test_board_file_error_wraps_board_error() {
        let err: BoardFileError = BoardError::InvalidDimensions {
            width: 0,
            height: 3,
        }
        .into();
        assert!(matches!(err, BoardFileError::Board(_)));
        assert_eq!(
            err.to_string(),
            "board dimensions must be positive, got 0x3"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidVar {
            name: "MINESWEEPER_PORT",
            value: "http".to_string(),
            reason: "not a port number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"http\" for MINESWEEPER_PORT: not a port number"
        );
    }
}

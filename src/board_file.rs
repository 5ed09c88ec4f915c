//! Loader for board files.
//!
//! ```text
//! FILE    ::= BOARD LINE+
//! BOARD   ::= X SPACE Y NEWLINE
//! LINE    ::= (VAL SPACE)* VAL NEWLINE
//! VAL     ::= 0 | 1
//! ```
//!
//! `1` marks a bomb. Rows are listed top to bottom.

use std::{fs, path::Path};

use tracing::info;

use crate::{
    data::Board,
    error::{BoardFileError, ConfigError},
};

fn parse_dimension(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let (x, y) = line.split_once(' ')?;
    Some((parse_dimension(x)?, parse_dimension(y)?))
}

pub fn parse_board_file(contents: &str) -> Result<Board, BoardFileError> {
    let mut lines = contents.lines();

    let header = lines.next().ok_or(BoardFileError::MissingHeader)?;
    let (width, height) =
        parse_header(header).ok_or_else(|| BoardFileError::InvalidHeader(header.to_string()))?;

    // grown row by row; the header alone must not drive the allocation
    let mut bombs = Vec::new();
    let mut rows = 0;

    for (i, line) in lines.enumerate() {
        let number = i + 2;
        if line.is_empty() && rows == height {
            // trailing blank line
            continue;
        }

        let values = line
            .split(' ')
            .map(|value| match value {
                "0" => Some(false),
                "1" => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| BoardFileError::InvalidRow {
                line: number,
                content: line.to_string(),
            })?;

        if values.len() != width {
            return Err(BoardFileError::RowWidth {
                line: number,
                expected: width,
                got: values.len(),
            });
        }

        bombs.extend(values);
        rows += 1;
    }

    if rows != height {
        return Err(BoardFileError::RowCount {
            expected: height,
            got: rows,
        });
    }

    Ok(Board::new(width, height, &bombs)?)
}

pub fn load_board_file(path: &Path) -> Result<Board, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadBoardFile {
        path: path.to_path_buf(),
        source,
    })?;

    let board = parse_board_file(&contents).map_err(|source| ConfigError::BoardFile {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Loaded {}x{} board with {} bombs from {}",
        board.width,
        board.height,
        board.bombs(),
        path.display()
    );
    Ok(board)
}

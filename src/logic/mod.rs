use std::fmt;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::{
    data::{Board, Cell, Pos, RevealedState},
    error::BoardError,
};

pub mod game;

pub use game::{Game, SharedGame};

/// Chance that any given cell of a random board holds a bomb.
pub const BOMB_PROBABILITY: f64 = 0.25;

pub const BOOM: &str = "BOOM!";

/// Result of digging a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigOutcome {
    /// A bomb was dug and removed.
    Boom,
    /// Nothing exploded; carries the board as rendered by [`Board::look`].
    Board(String),
}

impl fmt::Display for DigOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigOutcome::Boom => f.write_str(BOOM),
            DigOutcome::Board(rendering) => f.write_str(rendering),
        }
    }
}

fn generate_bombs<R: Rng + ?Sized>(cells: usize, rng: &mut R) -> Vec<bool> {
    (0..cells)
        .map(|_| rng.random_bool(BOMB_PROBABILITY))
        .collect()
}

fn cell_count(width: usize, height: usize) -> Result<usize, BoardError> {
    if width == 0 || height == 0 {
        return Err(BoardError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(BoardError::TooLarge { width, height })
}

/// In-bounds neighbours of `pos`, up to eight of them.
fn neighbors(pos: Pos, width: usize, height: usize) -> impl Iterator<Item = Pos> {
    (-1isize..=1)
        .flat_map(|dy| (-1isize..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| {
            let x = pos.x.checked_add_signed(dx)?;
            let y = pos.y.checked_add_signed(dy)?;
            (x < width && y < height).then_some(Pos { x, y })
        })
}

fn count_adjacent_bombs(bombs: &[bool], pos: Pos, width: usize, height: usize) -> u8 {
    neighbors(pos, width, height)
        .filter(|n| bombs[n.x + n.y * width])
        .count() as u8
}

fn generate_cells(bombs: &[bool], width: usize, height: usize) -> Vec<Cell> {
    bombs
        .iter()
        .enumerate()
        .map(|(i, bomb)| Cell {
            bomb: *bomb,
            adjacent: count_adjacent_bombs(
                bombs,
                Pos {
                    x: i % width,
                    y: i / width,
                },
                width,
                height,
            ),
            revealed: RevealedState::Hidden,
        })
        .collect()
}

fn symbol(cell: &Cell) -> char {
    match cell.revealed {
        RevealedState::Hidden => '-',
        RevealedState::Flagged => 'F',
        RevealedState::Revealed if cell.adjacent == 0 => ' ',
        RevealedState::Revealed => {
            char::from_digit(u32::from(cell.adjacent), 10).unwrap_or('?')
        }
    }
}

impl Board {
    /// Builds a board from row-major bomb placements, all cells hidden.
    pub fn new(width: usize, height: usize, bombs: &[bool]) -> Result<Self, BoardError> {
        let expected = cell_count(width, height)?;
        if bombs.len() != expected {
            return Err(BoardError::CellCount {
                expected,
                got: bombs.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells: generate_cells(bombs, width, height),
        })
    }

    pub fn random(width: usize, height: usize) -> Result<Self, BoardError> {
        Self::random_with(width, height, &mut rand::rng())
    }

    pub fn random_with<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        let bombs = generate_bombs(cell_count(width, height)?, rng);
        Self::new(width, height, &bombs)
    }

    pub fn bombs(&self) -> usize {
        self.cells.iter().filter(|cell| cell.bomb).count()
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        if !self.validate_pos(&pos) {
            return None;
        }
        self.cells.get(pos.x + pos.y * self.width)
    }

    /// Renders the player-visible board: one row per line, cells separated
    /// by single spaces, no trailing newline.
    pub fn look(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|cell| symbol(cell).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[instrument(level = "trace", skip(self))]
    pub fn dig(&mut self, x: i64, y: i64) -> DigOutcome {
        let Some(pos) = self.resolve(x, y) else {
            debug!("Ignoring dig outside the board at ({}, {})", x, y);
            return DigOutcome::Board(self.look());
        };

        let index = self.index(pos);
        let Cell {
            bomb,
            adjacent,
            revealed,
        } = self.cells[index];
        if revealed != RevealedState::Hidden {
            debug!("Ignoring dig on {:?} cell ({}, {})", revealed, x, y);
            return DigOutcome::Board(self.look());
        }

        if bomb {
            warn!("Bomb dug at ({}, {})", x, y);
            self.remove_bomb(pos);
            self.flood_reveal(pos);
            return DigOutcome::Boom;
        }

        if adjacent == 0 {
            self.flood_reveal(pos);
        } else {
            self.cells[index].revealed = RevealedState::Revealed;
        }

        DigOutcome::Board(self.look())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn flag(&mut self, x: i64, y: i64) -> String {
        if let Some(pos) = self.resolve(x, y) {
            let index = self.index(pos);
            if self.cells[index].revealed == RevealedState::Hidden {
                self.cells[index].revealed = RevealedState::Flagged;
                debug!("Cell ({}, {}) flagged", x, y);
            }
        }

        self.look()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn deflag(&mut self, x: i64, y: i64) -> String {
        if let Some(pos) = self.resolve(x, y) {
            let index = self.index(pos);
            if self.cells[index].revealed == RevealedState::Flagged {
                self.cells[index].revealed = RevealedState::Hidden;
                debug!("Cell ({}, {}) deflagged", x, y);
            }
        }

        self.look()
    }

    fn remove_bomb(&mut self, pos: Pos) {
        let index = self.index(pos);
        self.cells[index].bomb = false;

        for neighbor in neighbors(pos, self.width, self.height) {
            let index = self.index(neighbor);
            let cell = &mut self.cells[index];
            cell.adjacent = cell.adjacent.saturating_sub(1);
        }
    }

    /// Reveals `start` and, while the revealed cells have no bomb
    /// neighbours, keeps revealing outwards. Bombs are never revealed and a
    /// cell that is already revealed is never visited twice. Flags in the
    /// way are overridden.
    fn flood_reveal(&mut self, start: Pos) {
        let index = self.index(start);
        self.cells[index].revealed = RevealedState::Revealed;

        let mut stack = vec![start];
        let mut revealed = 1;

        while let Some(pos) = stack.pop() {
            if self.cells[self.index(pos)].adjacent != 0 {
                continue;
            }

            for neighbor in neighbors(pos, self.width, self.height) {
                let index = self.index(neighbor);
                let cell = &mut self.cells[index];
                if cell.bomb || cell.revealed == RevealedState::Revealed {
                    continue;
                }

                cell.revealed = RevealedState::Revealed;
                revealed += 1;
                if cell.adjacent == 0 {
                    stack.push(neighbor);
                }
            }
        }

        debug!(
            "Flood reveal from ({}, {}) uncovered {} cells",
            start.x, start.y, revealed
        );
    }

    fn resolve(&self, x: i64, y: i64) -> Option<Pos> {
        let pos = Pos {
            x: usize::try_from(x).ok()?,
            y: usize::try_from(y).ok()?,
        };
        self.validate_pos(&pos).then_some(pos)
    }

    fn index(&self, pos: Pos) -> usize {
        pos.x + pos.y * self.width
    }

    fn validate_pos(&self, pos: &Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.look())
    }
}

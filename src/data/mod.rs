#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealedState {
    Hidden,
    Flagged,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

/// A single square. `adjacent` is kept up to date for bombs as well, so a
/// removed bomb already knows how many bombs still surround it.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub bomb: bool,
    pub adjacent: u8,
    pub revealed: RevealedState,
}

/// Row-major grid: the cell at `(x, y)` lives at `x + y * width`.
#[derive(Debug, Clone)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
}

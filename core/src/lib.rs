#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod session;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    /// The classic beginner board.
    pub const DEFAULT: Self = Self::new_unchecked((10, 10), 10);

    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a playable configuration: each dimension is at least 1 and at least
    /// one cell stays free of mines.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let max_mines = mult(rows, cols) - 1;
        if mines > max_mines {
            log::warn!(
                "Too many mines for a {}x{} board, requested {} but clamped to {}",
                rows,
                cols,
                mines,
                max_mines
            );
        }
        Self::new_unchecked((rows, cols), mines.min(max_mines))
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mines and adjacency counts of a board. Counts are computed once when the layout
/// is built and never change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutParts")]
pub struct MineLayout {
    cells: Array2<CellValue>,
    mine_count: CellCount,
}

#[derive(Deserialize)]
struct LayoutParts {
    cells: Array2<CellValue>,
    mine_count: CellCount,
}

impl TryFrom<LayoutParts> for MineLayout {
    type Error = GameError;

    /// Rebuilds the layout from its mines and keeps it only if the stored counts
    /// agree.
    fn try_from(parts: LayoutParts) -> Result<Self> {
        let layout = Self::from_mine_mask(&parts.cells.map(|cell| cell.is_mine()))?;
        if layout.cells != parts.cells || layout.mine_count != parts.mine_count {
            return Err(GameError::InconsistentLayout);
        }
        Ok(layout)
    }
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        let max = usize::from(Coord::MAX);
        if rows == 0 || cols == 0 || rows > max || cols > max {
            return Err(GameError::InvalidBoardShape);
        }

        let layout = Self::from_mine_mask_unchecked(mine_mask);
        if layout.mine_count >= layout.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(layout)
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(&mine_mask)
    }

    pub(crate) fn from_mine_mask_unchecked(mine_mask: &Array2<bool>) -> Self {
        let cells = Array2::from_shape_fn(mine_mask.dim(), |(row, col)| {
            if mine_mask[[row, col]] {
                return CellValue::Mine;
            }
            let adjacent = mine_mask
                .iter_neighbors((row as Coord, col as Coord))
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count();
            CellValue::Safe(adjacent as u8)
        });
        let mine_count = cells.iter().filter(|cell| cell.is_mine()).count() as CellCount;

        Self { cells, mine_count }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.cells)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn cells(&self) -> &Array2<CellValue> {
        &self.cells
    }

    pub fn value_at(&self, coords: Coord2) -> Option<CellValue> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.value_at(coords).is_some_and(CellValue::is_mine)
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> Option<u8> {
        self.value_at(coords).and_then(CellValue::adjacent_mines)
    }

    /// Whether the cell or any of its neighbors holds a mine.
    pub fn has_mine_near(&self, coords: Coord2) -> bool {
        self.contains_mine(coords) || self.iter_neighbors(coords).any(|pos| self[pos].is_mine())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = CellValue;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Continue,
    HitMine,
}

impl RevealOutcome {
    pub const fn is_hit_mine(self) -> bool {
        matches!(self, Self::HitMine)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// Change in the number of placed flags.
    pub const fn delta(self) -> i8 {
        match self {
            Self::NoChange => 0,
            Self::Flagged => 1,
            Self::Unflagged => -1,
        }
    }
}

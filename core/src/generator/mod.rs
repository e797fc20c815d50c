use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    /// Lays out `config.mines` mines, never inside `exclude`. May place fewer when
    /// the zone leaves too few eligible cells.
    fn generate(&mut self, config: GameConfig, exclude: ExclusionZone) -> MineLayout;
}

/// Cells mine placement must avoid: the 3x3 neighborhood of a center cell,
/// clipped to the board, or nothing at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionZone {
    center: Option<Coord2>,
}

impl ExclusionZone {
    pub const EMPTY: Self = Self { center: None };

    pub const fn around(center: Coord2) -> Self {
        Self {
            center: Some(center),
        }
    }

    pub const fn center(&self) -> Option<Coord2> {
        self.center
    }

    pub const fn contains(&self, coords: Coord2) -> bool {
        match self.center {
            Some(center) => is_adjacent_or_same(center, coords),
            None => false,
        }
    }

    /// Number of board cells covered by the zone.
    pub fn cell_count(&self, size: Coord2) -> CellCount {
        match self.center {
            Some(center) if in_bounds(center, size) => {
                NeighborIter::new(center, size).count() as CellCount + 1
            }
            _ => 0,
        }
    }
}

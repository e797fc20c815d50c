use serde::{Deserialize, Serialize};

/// Player-visible state of a cell, independent of what lies underneath.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

impl Visibility {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

/// What a cell of the mine layout holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    /// Safe cell with the number of mined neighbors.
    Safe(u8),
}

impl CellValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn adjacent_mines(self) -> Option<u8> {
        match self {
            Self::Mine => None,
            Self::Safe(count) => Some(count),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Safe(0)
    }
}

/// What the presentation layer should draw for a cell: the layout value is only
/// exposed once the cell is revealed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Open(u8),
    Mine,
}

impl CellView {
    pub const fn new(visibility: Visibility, value: CellValue) -> Self {
        match (visibility, value) {
            (Visibility::Hidden, _) => Self::Hidden,
            (Visibility::Flagged, _) => Self::Flagged,
            (Visibility::Revealed, CellValue::Mine) => Self::Mine,
            (Visibility::Revealed, CellValue::Safe(count)) => Self::Open(count),
        }
    }

    // whether the cell is visually closed
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

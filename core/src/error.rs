use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape is empty or too large")]
    InvalidBoardShape,
    #[error("Adjacency counts do not match the mines")]
    InconsistentLayout,
    #[error("Visibility grid does not match the mine layout")]
    MismatchedShapes,
}

pub type Result<T> = core::result::Result<T, GameError>;

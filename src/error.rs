use thiserror::Error;

/// Precondition violations. All of these are fatal and surface before any
/// screen is built, except `NoFreeSlot` which signals a bookkeeping bug.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no words to lay out")]
    EmptyInput,

    #[error("row {row} has no `text` field")]
    MissingTextField { row: usize },

    #[error("memory box needs at least one slot")]
    ZeroSlotMemoryBox,

    #[error("memory box has no unfilled slot left")]
    NoFreeSlot,

    #[error("text box height {height} cannot hold {lines} lines")]
    TextBoxTooSmall { height: f64, lines: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("unknown key name `{0}`")]
    UnknownKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

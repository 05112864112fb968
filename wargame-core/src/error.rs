//! Error types for the game engine

use crate::board::{Coord, CoordPair};

/// Why an action was rejected by the rules engine
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),

    #[error("there is no unit at {0}")]
    EmptySource(Coord),

    #[error("the unit at {0} belongs to the other player")]
    NotYourUnit(Coord),

    #[error("a Command unit cannot self-destruct")]
    CommandCannotSelfDestruct,

    #[error("{0} is not an orthogonal neighbor step")]
    NotAdjacent(CoordPair),

    #[error("this unit cannot move in that direction")]
    WrongDirection,

    #[error("the unit at {0} is engaged in combat and cannot move")]
    Engaged(Coord),

    #[error("the unit at {0} already has full health")]
    AlreadyFullHealth(Coord),

    #[error("this unit has no repair ability for that target")]
    CannotRepair,
}

/// Malformed coordinate text
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} characters, got {input:?}")]
    Length { expected: usize, input: String },

    #[error("invalid row {0:?} (expected A-Z)")]
    Row(char),

    #[error("invalid column {0:?} (expected 0-f)")]
    Column(char),
}

/// Invalid or unreadable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("board dimension {0} is out of range (4..=16)")]
    Dimension(u8),

    #[error("max depth must be at least 1")]
    Depth,

    #[error("max time must be between 0 and 1e9 seconds, got {0}")]
    Time(f64),

    #[error("max game time must be between 0 and 1e9 seconds, got {0}")]
    GameTime(f64),

    #[error("compactness lookahead {0} is out of range (1..=16)")]
    Lookahead(i8),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

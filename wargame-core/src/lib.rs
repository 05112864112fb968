//! AI Wargame Core - Game engine and AI
//!
//! This crate provides the core game logic for the wargame:
//! - Square grid coordinates and board storage
//! - Unit kinds with damage and repair tables
//! - Game state, action classification and effects
//! - Position evaluation with a compactness heuristic
//! - Time-bounded minimax AI with alpha-beta pruning

pub mod board;
pub mod units;
pub mod game;
pub mod eval;
pub mod ai;
pub mod config;
pub mod stats;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, Coord, CoordPair};
pub use units::{Unit, UnitKind, DAMAGE_TABLE, MAX_HEALTH, REPAIR_TABLE};
pub use game::{ActionKind, ActionReport, GameState, Player, UnitEvent};
pub use eval::{evaluate, Heuristics};
pub use ai::{AlphaBetaAI, Clock, ManualClock, SearchOutcome, SystemClock};
pub use config::{GameConfig, GameType};
pub use stats::Stats;
pub use error::{ConfigError, IllegalAction, ParseError};

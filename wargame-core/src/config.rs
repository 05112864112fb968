//! Game configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::eval::Heuristics;
use crate::game::Player;

/// Smallest board that fits both starting corners without overlap
pub const MIN_DIM: u8 = 4;

/// Largest board the coordinate text form can address (columns 0-f)
pub const MAX_DIM: u8 = 16;

/// Largest accepted time budget, in seconds
pub const MAX_SECONDS: f64 = 1e9;

/// Which sides are played by a human
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    #[default]
    AttackerVsDefender,
    AttackerVsComp,
    CompVsDefender,
    CompVsComp,
}

impl GameType {
    /// Whether `player` is controlled by a human in this game type
    pub fn is_human(self, player: Player) -> bool {
        match self {
            GameType::AttackerVsDefender => true,
            GameType::AttackerVsComp => player == Player::Attacker,
            GameType::CompVsDefender => player == Player::Defender,
            GameType::CompVsComp => false,
        }
    }
}

/// Game options
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dim: u8,
    /// Search depth in plies
    pub max_depth: u32,
    /// Search time budget per move, in seconds
    pub max_time: f64,
    /// Turn limit; the Defender wins when it is reached
    pub max_turns: Option<u32>,
    /// Whole-game time budget, in seconds
    pub max_game_time: Option<f64>,
    pub game_type: GameType,
    pub alpha_beta: bool,
    pub randomize_moves: bool,
    pub seed: u64,
    /// Game broker URL for relaying moves with a remote opponent
    pub broker: Option<String>,
    pub heuristics: Heuristics,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dim: 5,
            max_depth: 4,
            max_time: 5.0,
            max_turns: Some(100),
            max_game_time: None,
            game_type: GameType::default(),
            alpha_beta: true,
            randomize_moves: false,
            seed: 42,
            broker: None,
            heuristics: Heuristics::default(),
        }
    }
}

impl GameConfig {
    pub fn move_time(&self) -> Duration {
        seconds(self.max_time)
    }

    pub fn game_time(&self) -> Option<Duration> {
        self.max_game_time.map(seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIM..=MAX_DIM).contains(&self.dim) {
            return Err(ConfigError::Dimension(self.dim));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Depth);
        }
        if !in_time_range(self.max_time) {
            return Err(ConfigError::Time(self.max_time));
        }
        if let Some(secs) = self.max_game_time {
            if !in_time_range(secs) {
                return Err(ConfigError::GameTime(secs));
            }
        }
        let lookahead = self.heuristics.lookahead;
        if !(1..=MAX_DIM as i8).contains(&lookahead) {
            return Err(ConfigError::Lookahead(lookahead));
        }
        Ok(())
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn in_time_range(secs: f64) -> bool {
    secs > 0.0 && secs <= MAX_SECONDS
}

/// Seconds to a duration without panicking: negative or NaN is zero, overflow saturates
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 { Duration::MAX } else { Duration::ZERO })
}

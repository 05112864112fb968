//! Unit kinds, combat tables and health mutation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::Player;

/// Maximum (and starting) health of every unit
pub const MAX_HEALTH: u8 = 9;

/// Unit kind. Ordinals index the damage and repair tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Command = 0,
    Support = 1,
    Striker = 2,
    Trooper = 3,
    Barrier = 4,
    Detonator = 5,
}

impl UnitKind {
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Command,
        UnitKind::Support,
        UnitKind::Striker,
        UnitKind::Trooper,
        UnitKind::Barrier,
        UnitKind::Detonator,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitKind::Command => "Command",
            UnitKind::Support => "Support",
            UnitKind::Striker => "Striker",
            UnitKind::Trooper => "Trooper",
            UnitKind::Barrier => "Barrier",
            UnitKind::Detonator => "Detonator",
        }
    }

    /// Heavy kinds may only advance toward the enemy corner
    pub fn is_direction_locked(self) -> bool {
        matches!(self, UnitKind::Command | UnitKind::Barrier | UnitKind::Trooper)
    }
}

/// Damage dealt by row kind to column kind
pub static DAMAGE_TABLE: [[u8; 6]; 6] = [
    //Cmd Sup Str Tro Bar Det
    [3, 3, 3, 3, 1, 3], // Command
    [1, 1, 6, 1, 1, 1], // Support
    [9, 6, 1, 6, 1, 6], // Striker
    [3, 3, 3, 3, 1, 3], // Trooper
    [1, 1, 1, 1, 1, 1], // Barrier
    [1, 1, 1, 1, 1, 1], // Detonator
];

/// Health restored by row kind to column kind
pub static REPAIR_TABLE: [[u8; 6]; 6] = [
    //Cmd Sup Str Tro Bar Det
    [0, 1, 1, 0, 0, 0], // Command
    [3, 0, 0, 3, 3, 0], // Support
    [0, 0, 0, 0, 0, 0], // Striker
    [0, 0, 0, 0, 0, 0], // Trooper
    [0, 0, 0, 0, 0, 0], // Barrier
    [0, 0, 0, 0, 0, 0], // Detonator
];

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub owner: Player,
    pub kind: UnitKind,
    pub health: u8,
}

impl Unit {
    pub fn new(owner: Player, kind: UnitKind) -> Self {
        Self {
            owner,
            kind,
            health: MAX_HEALTH,
        }
    }

    pub fn with_health(owner: Player, kind: UnitKind, health: u8) -> Self {
        Self {
            owner,
            kind,
            health: health.min(MAX_HEALTH),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_command(&self) -> bool {
        self.kind == UnitKind::Command
    }

    /// Apply a signed health delta, clamped to [0, MAX_HEALTH]
    pub fn mod_health(&mut self, delta: i32) {
        let health = (self.health as i32 + delta).clamp(0, MAX_HEALTH as i32);
        self.health = health as u8;
    }

    /// How much this unit damages `target`, never more than the target has left
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        DAMAGE_TABLE[self.kind.index()][target.kind.index()].min(target.health)
    }

    /// How much this unit repairs `target`, never past full health
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        REPAIR_TABLE[self.kind.index()][target.kind.index()]
            .min(MAX_HEALTH.saturating_sub(target.health))
    }
}

impl fmt::Display for Unit {
    /// e.g. `aC9` for a full-health attacking Command
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = match self.owner {
            Player::Attacker => 'a',
            Player::Defender => 'd',
        };
        let kind = self.kind.name().chars().next().unwrap_or('?');
        write!(f, "{}{}{}", owner, kind, self.health)
    }
}

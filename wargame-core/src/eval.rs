//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::ORTHOGONAL;
use crate::game::{GameState, Player};
use crate::units::UnitKind;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Material value of each unit kind (indexed by kind ordinal)
    pub kind_values: [i64; 6],
    /// Multiplier on the material difference
    pub material_weight: i64,
    /// Multiplier on the compactness term
    pub compactness_weight: i64,
    /// Multiplier on the health/count differential
    pub secondary_weight: i64,
    pub command_health_weight: i64,
    pub unit_count_weight: i64,
    /// How far compactness looks along each direction
    pub lookahead: i8,
}

impl Default for Heuristics {
    fn default() -> Self {
        let mut kind_values = [3; 6];
        kind_values[UnitKind::Command.index()] = 999;

        Self {
            kind_values,
            material_weight: 2,
            compactness_weight: 1,
            secondary_weight: 1,
            command_health_weight: 10,
            unit_count_weight: 4,
            lookahead: 4,
        }
    }
}

/// Per-side aggregates used by the evaluation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SideTotals {
    material: i64,
    health: i64,
    units: i64,
    command_health: i64,
}

fn side_totals(state: &GameState, player: Player, heuristics: &Heuristics) -> SideTotals {
    state
        .player_units(player)
        .fold(SideTotals::default(), |mut totals, (_, unit)| {
            totals.material += heuristics.kind_values[unit.kind.index()];
            totals.health += unit.health as i64;
            totals.units += 1;
            if unit.is_command() {
                totals.command_health = unit.health as i64;
            }
            totals
        })
}

/// Sum over `player`'s units of the widest gap to a friendly unit in any
/// cardinal direction (within `lookahead` cells), halved
pub fn compactness(state: &GameState, player: Player, lookahead: i8) -> i64 {
    // Steps past the board edge never find a unit
    let lookahead = lookahead.min(state.board().dim() as i8);
    let total: i64 = state
        .player_units(player)
        .map(|(coord, _)| {
            ORTHOGONAL
                .iter()
                .map(|&(dr, dc)| {
                    (1..=lookahead)
                        .find(|&step| {
                            state
                                .get(coord.offset(dr * step, dc * step))
                                .is_some_and(|unit| unit.owner == player)
                        })
                        .map_or(0, |step| (step - 1) as i64)
                })
                .max()
                .unwrap_or(0)
        })
        .sum();
    total / 2
}

/// Evaluate position from `player`'s perspective (higher is better for `player`)
pub fn evaluate(state: &GameState, player: Player, heuristics: &Heuristics) -> i64 {
    state.stats().record_evaluation();

    let mine = side_totals(state, player, heuristics);
    let theirs = side_totals(state, player.opponent(), heuristics);

    let material = mine.material - theirs.material;
    let secondary = heuristics.command_health_weight * (mine.command_health - theirs.command_health)
        + heuristics.unit_count_weight * (mine.units - theirs.units)
        + (mine.health - theirs.health);

    let spacing = heuristics.compactness_weight * compactness(state, player, heuristics.lookahead);
    let spacing = match player {
        Player::Attacker => spacing,
        Player::Defender => -spacing,
    };

    heuristics.material_weight * material + spacing + heuristics.secondary_weight * secondary
}

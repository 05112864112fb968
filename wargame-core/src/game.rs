//! Game state, action rules and turn logic

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::board::{Board, Coord, CoordPair};
use crate::config::GameConfig;
use crate::error::IllegalAction;
use crate::stats::Stats;
use crate::units::{Unit, MAX_HEALTH};

/// Health lost by every unit caught in a self-destruct blast
const SELF_DESTRUCT_DAMAGE: i32 = 2;

// ============================================================================
// CORE TYPES
// ============================================================================

/// The two sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Attacker = 0,
    Defender = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Attacker => Player::Defender,
            Player::Defender => Player::Attacker,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Attacker => "Attacker",
            Player::Defender => "Defender",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a legal coordinate pair does
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Attack,
    Repair,
    SelfDestruct,
}

/// A single observable change caused by an action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitEvent {
    Moved { unit: Unit, from: Coord, to: Coord },
    Damaged { coord: Coord, unit: Unit, amount: u8 },
    Repaired { coord: Coord, unit: Unit, amount: u8 },
    Destroyed { coord: Coord, unit: Unit },
}

impl fmt::Display for UnitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            UnitEvent::Moved { unit, from, to } => write!(f, "{} moved from {} to {}", unit, from, to),
            UnitEvent::Damaged { coord, unit, amount } => {
                write!(f, "{} {} at {} lost {} health", unit.owner, unit.kind.name(), coord, amount)
            }
            UnitEvent::Repaired { coord, unit, amount } => {
                write!(f, "{} {} at {} repaired for {}", unit.owner, unit.kind.name(), coord, amount)
            }
            UnitEvent::Destroyed { coord, unit } => {
                write!(f, "{} {} at {} was destroyed", unit.owner, unit.kind.name(), coord)
            }
        }
    }
}

/// Result of a real (non-search) action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    pub pair: CoordPair,
    pub kind: ActionKind,
    pub events: Vec<UnitEvent>,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state. Cloning deep-copies the board and shares config and stats.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    next_player: Player,
    turns_played: u32,
    attacker_has_command: bool,
    defender_has_command: bool,
    /// Wall-clock time consumed by the live game so far
    game_elapsed: Duration,
    config: Rc<GameConfig>,
    stats: Rc<Stats>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game with the standard starting layout
    pub fn new(config: GameConfig) -> Self {
        let board = Board::initial(config.dim);
        Self::with_board(board, config)
    }

    /// New game from an arbitrary position; the board's dimension wins over the config's
    pub fn with_board(board: Board, mut config: GameConfig) -> Self {
        config.dim = board.dim();
        let has_command = |player: Player| {
            board
                .units()
                .any(|(_, unit)| unit.owner == player && unit.is_command())
        };
        Self {
            attacker_has_command: has_command(Player::Attacker),
            defender_has_command: has_command(Player::Defender),
            board,
            next_player: Player::Attacker,
            turns_played: 0,
            game_elapsed: Duration::ZERO,
            config: Rc::new(config),
            stats: Rc::new(Stats::default()),
        }
    }

    pub fn with_next_player(mut self, player: Player) -> Self {
        self.next_player = player;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn game_elapsed(&self) -> Duration {
        self.game_elapsed
    }

    pub fn get(&self, coord: Coord) -> Option<Unit> {
        self.board.get(coord)
    }

    pub fn has_command(&self, player: Player) -> bool {
        match player {
            Player::Attacker => self.attacker_has_command,
            Player::Defender => self.defender_has_command,
        }
    }

    /// Units belonging to `player`, in row-major order
    pub fn player_units(&self, player: Player) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.board.units().filter(move |(_, unit)| unit.owner == player)
    }

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================

    /// Decide what `pair` would do for the side to move, without touching the board
    pub fn classify(&self, pair: CoordPair) -> Result<ActionKind, IllegalAction> {
        let CoordPair { src, dst } = pair;
        for coord in [src, dst] {
            if !self.board.is_valid(coord) {
                return Err(IllegalAction::OutOfBounds(coord));
            }
        }

        let unit = self.board.get(src).ok_or(IllegalAction::EmptySource(src))?;
        if unit.owner != self.next_player {
            return Err(IllegalAction::NotYourUnit(src));
        }

        if pair.is_self_destruct() {
            if unit.is_command() {
                return Err(IllegalAction::CommandCannotSelfDestruct);
            }
            return Ok(ActionKind::SelfDestruct);
        }

        if !src.is_adjacent(dst) {
            return Err(IllegalAction::NotAdjacent(pair));
        }

        match self.board.get(dst) {
            Some(target) if target.owner != unit.owner => Ok(ActionKind::Attack),
            Some(target) => {
                if target.health >= MAX_HEALTH {
                    Err(IllegalAction::AlreadyFullHealth(dst))
                } else if unit.repair_amount(&target) == 0 {
                    Err(IllegalAction::CannotRepair)
                } else {
                    Ok(ActionKind::Repair)
                }
            }
            None => {
                if unit.kind.is_direction_locked() && !moves_forward(unit.owner, src, dst) {
                    return Err(IllegalAction::WrongDirection);
                }
                if self.is_engaged(src, unit.owner) {
                    return Err(IllegalAction::Engaged(src));
                }
                Ok(ActionKind::Move)
            }
        }
    }

    pub fn is_legal(&self, pair: CoordPair) -> bool {
        self.classify(pair).is_ok()
    }

    /// Any enemy on an orthogonal neighbor of `coord`
    fn is_engaged(&self, coord: Coord, owner: Player) -> bool {
        coord
            .iter_adjacent()
            .filter_map(|c| self.board.get(c))
            .any(|unit| unit.owner != owner)
    }

    // ========================================================================
    // EFFECTS
    // ========================================================================

    /// Commit an already-classified action. Returns false if the board does
    /// not support that classification.
    pub fn apply(&mut self, pair: CoordPair, kind: ActionKind) -> bool {
        let CoordPair { src, dst } = pair;
        let Some(actor) = self.board.get(src) else {
            return false;
        };

        match kind {
            ActionKind::Move => {
                if !self.board.is_empty(dst) || !self.board.is_valid(dst) {
                    return false;
                }
                self.board.set(dst, Some(actor));
                self.board.set(src, None);
            }
            ActionKind::Attack => {
                let Some(target) = self.board.get(dst) else {
                    return false;
                };
                if target.owner == actor.owner {
                    return false;
                }
                // Both sides of the exchange use pre-combat health
                let to_actor = target.damage_amount(&actor);
                let to_target = actor.damage_amount(&target);
                self.mod_health(src, -(to_actor as i32));
                self.mod_health(dst, -(to_target as i32));
            }
            ActionKind::Repair => {
                let Some(target) = self.board.get(dst) else {
                    return false;
                };
                let amount = actor.repair_amount(&target);
                if target.owner != actor.owner || amount == 0 {
                    return false;
                }
                self.mod_health(dst, amount as i32);
            }
            ActionKind::SelfDestruct => {
                if !pair.is_self_destruct() || actor.is_command() {
                    return false;
                }
                for coord in src.iter_range(1) {
                    self.mod_health(coord, -SELF_DESTRUCT_DAMAGE);
                }
                self.board.set(src, None);
            }
        }
        true
    }

    /// Change a unit's health, removing it if it dies
    fn mod_health(&mut self, coord: Coord, delta: i32) {
        let Some(unit) = self.board.get_mut(coord) else {
            return;
        };
        unit.mod_health(delta);
        if !unit.is_alive() {
            self.remove(coord);
        }
    }

    fn remove(&mut self, coord: Coord) {
        if let Some(unit) = self.board.get(coord) {
            if unit.is_command() {
                match unit.owner {
                    Player::Attacker => self.attacker_has_command = false,
                    Player::Defender => self.defender_has_command = false,
                }
            }
            self.board.set(coord, None);
        }
    }

    /// Classify and perform an action for a real turn. Does not advance the turn.
    pub fn apply_action(&mut self, pair: CoordPair) -> Result<ActionReport, IllegalAction> {
        let kind = self.classify(pair)?;
        let before = self.board.clone();
        let applied = self.apply(pair, kind);
        debug_assert!(applied, "classified action {} failed to apply", pair);

        let events = match kind {
            ActionKind::Move => before
                .get(pair.src)
                .map(|unit| UnitEvent::Moved { unit, from: pair.src, to: pair.dst })
                .into_iter()
                .collect(),
            ActionKind::Attack | ActionKind::Repair => {
                diff_cells(&before, &self.board, [pair.src, pair.dst])
            }
            ActionKind::SelfDestruct => diff_cells(&before, &self.board, pair.src.iter_range(1)),
        };

        Ok(ActionReport { pair, kind, events })
    }

    /// Hand the move to the other side
    pub fn advance_turn(&mut self) {
        self.next_player = self.next_player.opponent();
        self.turns_played += 1;
    }

    /// Successor state for search: the clone with `pair` applied and its turn advanced
    pub fn play(&self, pair: CoordPair) -> Option<GameState> {
        let kind = self.classify(pair).ok()?;
        let mut next = self.clone();
        if !next.apply(pair, kind) {
            return None;
        }
        next.advance_turn();
        Some(next)
    }

    /// Add live game time
    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.game_elapsed += elapsed;
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal pairs for the side to move: per unit in board order, the four
    /// neighbors (up, left, down, right) and then self-destruct
    pub fn move_candidates(&self) -> impl Iterator<Item = CoordPair> + '_ {
        self.player_units(self.next_player)
            .flat_map(|(src, _)| {
                src.iter_adjacent()
                    .chain(std::iter::once(src))
                    .map(move |dst| CoordPair::new(src, dst))
            })
            .filter(move |&pair| self.is_legal(pair))
    }

    // ========================================================================
    // TERMINATION
    // ========================================================================

    pub fn winner(&self) -> Option<Player> {
        if let Some(max_turns) = self.config.max_turns {
            if self.turns_played >= max_turns {
                return Some(Player::Defender);
            }
        }
        if let Some(budget) = self.config.game_time() {
            if self.game_elapsed >= budget {
                return Some(self.next_player.opponent());
            }
        }
        if !self.attacker_has_command {
            return Some(Player::Defender);
        }
        if !self.defender_has_command {
            return Some(Player::Attacker);
        }
        None
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }
}

/// Attacker advances up/left, Defender down/right
fn moves_forward(owner: Player, src: Coord, dst: Coord) -> bool {
    let (dr, dc) = (dst.row - src.row, dst.col - src.col);
    match owner {
        Player::Attacker => dr <= 0 && dc <= 0,
        Player::Defender => dr >= 0 && dc >= 0,
    }
}

/// Health changes and removals between two boards at the given cells
fn diff_cells(before: &Board, after: &Board, cells: impl IntoIterator<Item = Coord>) -> Vec<UnitEvent> {
    cells
        .into_iter()
        .filter_map(|coord| match (before.get(coord), after.get(coord)) {
            (Some(old), None) => Some(UnitEvent::Destroyed { coord, unit: old }),
            (Some(old), Some(new)) if new.health < old.health => Some(UnitEvent::Damaged {
                coord,
                unit: new,
                amount: old.health - new.health,
            }),
            (Some(old), Some(new)) if new.health > old.health => Some(UnitEvent::Repaired {
                coord,
                unit: new,
                amount: new.health - old.health,
            }),
            _ => None,
        })
        .collect()
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Next player: {}", self.next_player)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;
        writeln!(f)?;
        write!(f, "   ")?;
        let dim = self.board.dim() as i8;
        for col in 0..dim {
            write!(f, " {:^3}", Coord::new(0, col).col_char())?;
        }
        writeln!(f)?;
        for row in 0..dim {
            write!(f, "{}: ", Coord::new(row, 0).row_char())?;
            for col in 0..dim {
                match self.board.get(Coord::new(row, col)) {
                    Some(unit) => write!(f, " {:^3}", unit.to_string())?,
                    None => write!(f, " {:^3}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitKind;

    fn simple_game() -> GameState {
        GameState::new(GameConfig::default())
    }

    /// Position built from (row, col, owner, kind, health) entries
    fn position(units: &[(i8, i8, Player, UnitKind, u8)], next: Player) -> GameState {
        let mut board = Board::empty(5);
        for &(row, col, owner, kind, health) in units {
            board.set(Coord::new(row, col), Some(Unit::with_health(owner, kind, health)));
        }
        GameState::with_board(board, GameConfig::default()).with_next_player(next)
    }

    fn pair(s: &str) -> CoordPair {
        s.parse().unwrap()
    }

    #[test]
    fn test_game_creation() {
        let game = simple_game();
        assert_eq!(game.next_player(), Player::Attacker);
        assert_eq!(game.turns_played(), 0);
        assert!(game.has_command(Player::Attacker));
        assert!(game.has_command(Player::Defender));
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_diagonal_move_illegal() {
        let game = simple_game();
        // Attacker Striker at D4 stepping diagonally to C3
        assert_eq!(
            game.classify(pair("D4 C3")),
            Err(IllegalAction::NotAdjacent(pair("D4 C3")))
        );
        assert!(!game.is_legal(pair("D4 C3")));
        assert!(!game.is_legal(pair("C4 A4")));
    }

    #[test]
    fn test_basic_rejections() {
        let game = simple_game();
        assert_eq!(game.classify(pair("C2 C3")), Err(IllegalAction::EmptySource(Coord::new(2, 2))));
        assert_eq!(game.classify(pair("A0 B0")), Err(IllegalAction::NotYourUnit(Coord::new(0, 0))));
        assert_eq!(
            game.classify(CoordPair::from_quad(4, 4, 4, 5)),
            Err(IllegalAction::OutOfBounds(Coord::new(4, 5)))
        );
    }

    #[test]
    fn test_plain_move() {
        let mut game = simple_game();
        let report = game.apply_action(pair("C4 B4")).unwrap();
        assert_eq!(report.kind, ActionKind::Move);
        assert!(game.get(Coord::new(2, 4)).is_none());
        assert_eq!(game.get(Coord::new(1, 4)).unwrap().kind, UnitKind::Trooper);
        assert_eq!(report.events.len(), 1);
        // apply_action never advances the turn
        assert_eq!(game.next_player(), Player::Attacker);
    }

    #[test]
    fn test_directional_lock() {
        let game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Trooper, 9),
                (2, 0, Player::Attacker, UnitKind::Striker, 9),
                (0, 4, Player::Defender, UnitKind::Barrier, 9),
            ],
            Player::Attacker,
        );
        assert_eq!(game.classify(pair("C2 D2")), Err(IllegalAction::WrongDirection));
        assert_eq!(game.classify(pair("C2 C3")), Err(IllegalAction::WrongDirection));
        assert_eq!(game.classify(pair("C2 B2")), Ok(ActionKind::Move));
        assert_eq!(game.classify(pair("C2 C1")), Ok(ActionKind::Move));
        // Strikers are free to move any orthogonal direction
        assert_eq!(game.classify(pair("C0 D0")), Ok(ActionKind::Move));

        let game = game.with_next_player(Player::Defender);
        assert_eq!(game.classify(pair("A4 A3")), Err(IllegalAction::WrongDirection));
        assert_eq!(game.classify(pair("A4 B4")), Ok(ActionKind::Move));
    }

    #[test]
    fn test_directional_lock_ignores_occupied_targets() {
        // Attacker Trooper hitting an enemy below it
        let game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Trooper, 9),
                (3, 2, Player::Defender, UnitKind::Trooper, 9),
            ],
            Player::Attacker,
        );
        assert_eq!(game.classify(pair("C2 D2")), Ok(ActionKind::Attack));
    }

    #[test]
    fn test_engagement_lock() {
        let game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Striker, 9),
                (2, 1, Player::Defender, UnitKind::Trooper, 9),
                (3, 2, Player::Attacker, UnitKind::Trooper, 5),
                (4, 4, Player::Attacker, UnitKind::Support, 9),
            ],
            Player::Attacker,
        );
        assert_eq!(game.classify(pair("C2 B2")), Err(IllegalAction::Engaged(Coord::new(2, 2))));
        assert_eq!(game.classify(pair("C2 C3")), Err(IllegalAction::Engaged(Coord::new(2, 2))));
        assert_eq!(game.classify(pair("C2 C1")), Ok(ActionKind::Attack));
        // Striker has no repair ability, so the friendly target is rejected as a repair
        assert_eq!(game.classify(pair("C2 D2")), Err(IllegalAction::CannotRepair));
    }

    #[test]
    fn test_engaged_unit_can_still_repair() {
        let mut game = position(
            &[
                (2, 2, Player::Defender, UnitKind::Support, 9),
                (2, 1, Player::Attacker, UnitKind::Trooper, 9),
                (2, 3, Player::Defender, UnitKind::Trooper, 5),
            ],
            Player::Defender,
        );
        // Engaged, so moving away is blocked, but repairing a neighbor is not
        assert_eq!(game.classify(pair("C2 D2")), Err(IllegalAction::Engaged(Coord::new(2, 2))));
        assert_eq!(game.classify(pair("C2 C3")), Ok(ActionKind::Repair));

        let report = game.apply_action(pair("C2 C3")).unwrap();
        assert_eq!(report.kind, ActionKind::Repair);
        assert_eq!(game.get(Coord::new(2, 3)).unwrap().health, 8);
    }

    #[test]
    fn test_with_board_skips_dead_units() {
        let game = position(
            &[
                (0, 0, Player::Defender, UnitKind::Command, 0),
                (4, 4, Player::Attacker, UnitKind::Command, 9),
            ],
            Player::Attacker,
        );
        assert!(game.get(Coord::new(0, 0)).is_none());
        assert!(!game.has_command(Player::Defender));
        assert_eq!(game.winner(), Some(Player::Attacker));
    }

    #[test]
    fn test_command_attack_is_simultaneous() {
        let mut game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Command, 9),
                (1, 2, Player::Defender, UnitKind::Trooper, 9),
                (0, 0, Player::Defender, UnitKind::Command, 9),
            ],
            Player::Attacker,
        );
        let report = game.apply_action(pair("C2 B2")).unwrap();
        assert_eq!(report.kind, ActionKind::Attack);
        assert_eq!(game.get(Coord::new(2, 2)).unwrap().health, 6);
        assert_eq!(game.get(Coord::new(1, 2)).unwrap().health, 6);
        assert_eq!(report.events.len(), 2);
    }

    #[test]
    fn test_attack_destroys_command() {
        let mut game = position(
            &[
                (4, 4, Player::Attacker, UnitKind::Command, 9),
                (1, 1, Player::Attacker, UnitKind::Striker, 9),
                (1, 0, Player::Defender, UnitKind::Command, 9),
            ],
            Player::Attacker,
        );
        game.apply_action(pair("B1 B0")).unwrap();
        assert!(game.get(Coord::new(1, 0)).is_none());
        assert!(!game.has_command(Player::Defender));
        // Command hits back for 3 in the same exchange
        assert_eq!(game.get(Coord::new(1, 1)).unwrap().health, 6);
        assert_eq!(game.winner(), Some(Player::Attacker));
    }

    #[test]
    fn test_zero_health_unit_removed() {
        let mut game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Trooper, 9),
                (1, 2, Player::Defender, UnitKind::Support, 1),
            ],
            Player::Attacker,
        );
        let report = game.apply_action(pair("C2 B2")).unwrap();
        assert!(game.get(Coord::new(1, 2)).is_none());
        assert!(report.events.iter().any(|e| matches!(e, UnitEvent::Destroyed { .. })));
    }

    #[test]
    fn test_attack_symmetry() {
        for actor in UnitKind::ALL {
            for target in UnitKind::ALL {
                let forward = position(
                    &[(2, 2, Player::Attacker, actor, 9), (2, 3, Player::Defender, target, 9)],
                    Player::Attacker,
                );
                let backward = position(
                    &[(2, 2, Player::Defender, target, 9), (2, 3, Player::Attacker, actor, 9)],
                    Player::Defender,
                );
                let health = |g: &GameState, c: Coord| g.get(c).map_or(0, |u| u.health);

                let mut forward_after = forward.clone();
                forward_after.apply_action(pair("C2 C3")).unwrap();
                let mut backward_after = backward.clone();
                backward_after.apply_action(pair("C2 C3")).unwrap();

                let actor_delta = 9 - health(&forward_after, Coord::new(2, 2));
                let target_delta = 9 - health(&forward_after, Coord::new(2, 3));
                assert_eq!(actor_delta, 9 - health(&backward_after, Coord::new(2, 3)));
                assert_eq!(target_delta, 9 - health(&backward_after, Coord::new(2, 2)));
            }
        }
    }

    #[test]
    fn test_repair() {
        let mut game = position(
            &[
                (2, 2, Player::Defender, UnitKind::Support, 9),
                (2, 3, Player::Defender, UnitKind::Trooper, 5),
                (1, 2, Player::Defender, UnitKind::Barrier, 7),
                (3, 2, Player::Defender, UnitKind::Support, 5),
            ],
            Player::Defender,
        );
        let report = game.apply_action(pair("C2 C3")).unwrap();
        assert_eq!(report.kind, ActionKind::Repair);
        assert_eq!(game.get(Coord::new(2, 3)).unwrap().health, 8);

        // 7 + 3 clamps to 9
        game.apply_action(pair("C2 B2")).unwrap();
        assert_eq!(game.get(Coord::new(1, 2)).unwrap().health, 9);
        assert_eq!(
            game.classify(pair("C2 B2")),
            Err(IllegalAction::AlreadyFullHealth(Coord::new(1, 2)))
        );
        // Supports cannot repair each other
        assert_eq!(game.classify(pair("C2 D2")), Err(IllegalAction::CannotRepair));
    }

    #[test]
    fn test_command_cannot_self_destruct() {
        let mut game = simple_game();
        let before = game.board().clone();
        assert_eq!(
            game.apply_action(pair("E4 E4")),
            Err(IllegalAction::CommandCannotSelfDestruct)
        );
        assert_eq!(game.board(), &before);
        assert!(!game.apply(pair("E4 E4"), ActionKind::SelfDestruct));
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_self_destruct_blast() {
        let mut game = position(
            &[
                (2, 2, Player::Attacker, UnitKind::Detonator, 9),
                (1, 1, Player::Defender, UnitKind::Trooper, 9),
                (3, 3, Player::Attacker, UnitKind::Striker, 2),
                (2, 3, Player::Defender, UnitKind::Command, 9),
                (0, 2, Player::Defender, UnitKind::Barrier, 9),
            ],
            Player::Attacker,
        );
        let report = game.apply_action(pair("C2 C2")).unwrap();
        assert_eq!(report.kind, ActionKind::SelfDestruct);
        assert!(game.get(Coord::new(2, 2)).is_none());
        assert_eq!(game.get(Coord::new(1, 1)).unwrap().health, 7);
        assert_eq!(game.get(Coord::new(2, 3)).unwrap().health, 7);
        assert!(game.get(Coord::new(3, 3)).is_none());
        // Outside the blast
        assert_eq!(game.get(Coord::new(0, 2)).unwrap().health, 9);
        let destroyed = report
            .events
            .iter()
            .filter(|e| matches!(e, UnitEvent::Destroyed { .. }))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn test_self_destruct_at_edge() {
        let mut game = simple_game();
        game.apply_action(pair("A1 A1")).unwrap_err();
        let mut game = game.with_next_player(Player::Defender);
        game.apply_action(pair("A1 A1")).unwrap();
        assert!(game.get(Coord::new(0, 1)).is_none());
        assert_eq!(game.get(Coord::new(0, 0)).unwrap().health, 7);
        assert_eq!(game.get(Coord::new(1, 1)).unwrap().health, 7);
    }

    #[test]
    fn test_move_candidates() {
        let game = simple_game();
        let before = game.board().clone();
        let moves: Vec<_> = game.move_candidates().collect();
        assert_eq!(moves.len(), 11);
        assert_eq!(moves[0], pair("C4 B4"));
        assert_eq!(moves[1], pair("C4 C3"));
        assert_eq!(moves[2], pair("C4 C4"));
        assert!(moves.iter().all(|&mv| game.is_legal(mv)));
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_play_advances_clone_only() {
        let game = simple_game();
        let next = game.play(pair("C4 B4")).unwrap();
        assert_eq!(next.next_player(), Player::Defender);
        assert_eq!(next.turns_played(), 1);
        assert_eq!(game.turns_played(), 0);
        assert!(game.get(Coord::new(2, 4)).is_some());
        assert!(game.play(pair("C4 A4")).is_none());
    }

    #[test]
    fn test_turn_limit() {
        let config = GameConfig { max_turns: Some(1), ..Default::default() };
        let mut game = GameState::new(config);
        assert_eq!(game.winner(), None);
        game.advance_turn();
        assert_eq!(game.winner(), Some(Player::Defender));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_game_time_limit() {
        let config = GameConfig { max_game_time: Some(10.0), ..Default::default() };
        let mut game = GameState::new(config);
        game.record_elapsed(Duration::from_secs(9));
        assert_eq!(game.winner(), None);
        game.record_elapsed(Duration::from_secs(1));
        // Attacker was about to move when time ran out
        assert_eq!(game.winner(), Some(Player::Defender));
        game.advance_turn();
        assert_eq!(game.winner(), Some(Player::Attacker));
    }

    #[test]
    fn test_huge_game_time_does_not_panic() {
        let config = GameConfig { max_game_time: Some(1e30), ..Default::default() };
        let mut game = GameState::new(config);
        game.record_elapsed(Duration::from_secs(3600));
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_display() {
        let text = simple_game().to_string();
        assert!(text.contains("Next player: Attacker"));
        assert!(text.contains("dC9"));
        assert!(text.contains("aC9"));
        assert!(text.lines().any(|line| line.starts_with("E: ")));
    }
}

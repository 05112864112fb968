//! Depth- and time-bounded minimax AI with alpha-beta pruning

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::board::CoordPair;
use crate::config::GameConfig;
use crate::eval::{evaluate, Heuristics};
use crate::game::{GameState, Player};
use crate::stats::Stats;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Upper bound of any heuristic score
pub const MAX_SCORE: i64 = 2_000_000_000;

/// Lower bound of any heuristic score
pub const MIN_SCORE: i64 = -2_000_000_000;

/// Search stops exploring once less than this much of the budget remains
pub const SAFETY_MARGIN: Duration = Duration::from_millis(500);

// ============================================================================
// CLOCKS
// ============================================================================

/// Source of wall-clock time for the search deadline
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests: advances by `tick` on every read
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
    tick: Duration,
}

impl ManualClock {
    /// A clock that never moves
    pub fn frozen() -> Self {
        Self::ticking(Duration::ZERO)
    }

    pub fn ticking(tick: Duration) -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            tick,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let now = self.origin + self.offset.get();
        self.advance(self.tick);
        now
    }
}

/// Per-move time budget measured from the start of a search
struct Deadline<'a> {
    clock: &'a dyn Clock,
    start: Instant,
    budget: Duration,
}

impl<'a> Deadline<'a> {
    fn start(clock: &'a dyn Clock, budget: Duration) -> Self {
        Self {
            clock,
            start: clock.now(),
            budget,
        }
    }

    fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    fn is_near(&self) -> bool {
        self.budget.saturating_sub(self.elapsed()) < SAFETY_MARGIN
    }
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// What a search found
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<CoordPair>,
    /// Minimax value, positive favors the Attacker
    pub score: i64,
    /// Leaf evaluations performed
    pub nodes: u64,
    pub elapsed: Duration,
    /// The time budget cut the search short
    pub timed_out: bool,
}

/// Minimax AI player
pub struct AlphaBetaAI {
    pub max_depth: u32,
    pub max_time: Duration,
    pub alpha_beta: bool,
    pub randomize: bool,
    pub heuristics: Heuristics,
    rng: ChaCha8Rng,
    clock: Box<dyn Clock>,
}

impl AlphaBetaAI {
    pub fn new(max_depth: u32, heuristics: Heuristics) -> Self {
        Self {
            max_depth,
            max_time: Duration::from_secs(5),
            alpha_beta: true,
            randomize: false,
            heuristics,
            rng: ChaCha8Rng::seed_from_u64(42),
            clock: Box::new(SystemClock),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_time: config.move_time(),
            alpha_beta: config.alpha_beta,
            randomize: config.randomize_moves,
            heuristics: config.heuristics.clone(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Best move for the side to move; `None` only when it has no legal action
    pub fn suggest_move(&mut self, state: &GameState) -> Option<CoordPair> {
        self.search(state).best_move
    }

    pub fn search(&mut self, state: &GameState) -> SearchOutcome {
        let mut candidates: Vec<CoordPair> = state.move_candidates().collect();
        if self.randomize {
            candidates.shuffle(&mut self.rng);
        }

        let mut searcher = Searcher {
            deadline: Deadline::start(self.clock.as_ref(), self.max_time),
            heuristics: &self.heuristics,
            stats: state.stats(),
            root_player: state.next_player(),
            alpha_beta: self.alpha_beta,
            timed_out: false,
            nodes: 0,
        };

        let depth = self.max_depth.max(1);
        let (score, best_move) = if candidates.is_empty() {
            (searcher.leaf(state, 0), None)
        } else {
            searcher.expand(state, candidates.into_iter(), depth, MIN_SCORE, MAX_SCORE, 0)
        };

        let elapsed = searcher.deadline.elapsed();
        let outcome = SearchOutcome {
            best_move,
            score,
            nodes: searcher.nodes,
            elapsed,
            timed_out: searcher.timed_out,
        };
        state.stats().record_search(elapsed);

        if outcome.timed_out {
            tracing::info!("Search cut short by time budget after {:?}", elapsed);
        }
        tracing::debug!(
            "Search for {}: move={:?} score={} nodes={} elapsed={:?}",
            state.next_player(),
            best_move.map(|mv| mv.to_string()),
            score,
            outcome.nodes,
            elapsed
        );

        outcome
    }
}

// ============================================================================
// MINIMAX
// ============================================================================

/// State of one search, threaded through the recursion
struct Searcher<'a> {
    deadline: Deadline<'a>,
    heuristics: &'a Heuristics,
    stats: &'a Stats,
    root_player: Player,
    alpha_beta: bool,
    timed_out: bool,
    nodes: u64,
}

impl Searcher<'_> {
    fn minimax(&mut self, state: &GameState, depth: u32, alpha: i64, beta: i64, ply: u32) -> (i64, Option<CoordPair>) {
        if depth == 0 || state.is_terminal() || self.timed_out {
            return (self.leaf(state, ply), None);
        }
        self.expand(state, state.move_candidates(), depth, alpha, beta, ply)
    }

    /// Fold children into a max (Attacker) or min (Defender) node
    fn expand(
        &mut self,
        state: &GameState,
        candidates: impl Iterator<Item = CoordPair>,
        depth: u32,
        mut alpha: i64,
        mut beta: i64,
        ply: u32,
    ) -> (i64, Option<CoordPair>) {
        let maximizing = state.next_player() == Player::Attacker;
        let mut best_score = if maximizing { MIN_SCORE } else { MAX_SCORE };
        let mut best_move = None;

        for mv in candidates {
            let Some(child) = state.play(mv) else {
                continue;
            };
            let (score, _) = self.minimax(&child, depth - 1, alpha, beta, ply + 1);

            if maximizing {
                if best_move.is_none() || score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best_score);
            } else {
                if best_move.is_none() || score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best_score);
            }

            if self.alpha_beta && beta <= alpha {
                break;
            }
            if self.timed_out || self.deadline.is_near() {
                self.timed_out = true;
                break;
            }
        }

        match best_move {
            Some(_) => (best_score, best_move),
            // Nothing to play from here
            None => (self.leaf(state, ply), None),
        }
    }

    /// Static score in the Attacker-maximizing frame, from the root side's heuristic.
    /// Scoring each leaf from whichever side moves there would mix two frames in one min/max fold.
    fn leaf(&mut self, state: &GameState, ply: u32) -> i64 {
        self.nodes += 1;
        self.stats.record_depth(ply);
        let score = evaluate(state, self.root_player, self.heuristics);
        match self.root_player {
            Player::Attacker => score,
            Player::Defender => -score,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Play command - run a game between humans and/or the computer
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_game(), report_end()
//! - Level 3: human_turn(), broker_turn(), computer_turn()
//! - Level 4: formatting utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use wargame_core::{AlphaBetaAI, GameConfig, GameState, GameType, IllegalAction, Player};

use crate::broker::{self, Broker};
use crate::input;
use crate::transcript::{describe, Transcript};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who plays which side
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameTypeArg {
    /// Computer vs computer
    Auto,
    /// Human Attacker vs computer Defender
    Attacker,
    /// Computer Attacker vs human Defender
    Defender,
    /// Human vs human
    Manual,
}

impl From<GameTypeArg> for GameType {
    fn from(arg: GameTypeArg) -> Self {
        match arg {
            GameTypeArg::Auto => GameType::CompVsComp,
            GameTypeArg::Attacker => GameType::AttackerVsComp,
            GameTypeArg::Defender => GameType::CompVsDefender,
            GameTypeArg::Manual => GameType::AttackerVsDefender,
        }
    }
}

#[derive(Args)]
pub struct PlayArgs {
    /// JSON configuration file (flags below override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Game type
    #[arg(long, value_enum)]
    pub game_type: Option<GameTypeArg>,

    /// Maximum search depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Maximum search time per move, in seconds
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Maximum number of turns
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Maximum time for the whole game, in seconds
    #[arg(long)]
    pub max_game_time: Option<f64>,

    /// Board dimension
    #[arg(long)]
    pub dim: Option<u8>,

    /// Disable alpha-beta pruning
    #[arg(long)]
    pub no_alpha_beta: bool,

    /// Shuffle root moves to vary play
    #[arg(long)]
    pub randomize: bool,

    /// Seed for move randomization
    #[arg(long)]
    pub seed: Option<u64>,

    /// Game broker URL; the human side's moves are fetched from it
    #[arg(long)]
    pub broker: Option<String>,

    /// Transcript file
    #[arg(long, value_name = "FILE", default_value = "log.txt")]
    pub log: PathBuf,

    /// Do not write a transcript
    #[arg(long)]
    pub no_log: bool,
}

/// Why the game stopped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// Command destroyed, turn limit or game time
    Rules,
    /// The computer had no legal action
    NoMoves,
    /// The computer produced an illegal action
    IllegalMove(IllegalAction),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEnd {
    pub winner: Player,
    pub reason: EndReason,
    pub turns: u32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the configuration
/// 2. Play the game on stdin/stdout
/// 3. Report the result
pub fn run(args: PlayArgs) -> Result<()> {
    let config = build_config(&args)?;

    let mut transcript = if args.no_log {
        Transcript::disabled()
    } else {
        Transcript::open(&args.log)
            .with_context(|| format!("Failed to open transcript: {}", args.log.display()))?
    };

    tracing::info!(
        "Starting game: {:?} (depth={}, time={}s, alpha-beta={})",
        config.game_type,
        config.max_depth,
        config.max_time,
        config.alpha_beta
    );

    let broker = config.broker.as_deref().map(Broker::new);
    if let Some(broker) = &broker {
        tracing::info!("Relaying moves through broker at {}", broker.url());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    play_game(config, broker.as_ref(), &mut transcript, &mut input, &mut output)?;

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Merge the config file (if any) with command-line overrides
fn build_config(args: &PlayArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(game_type) = args.game_type {
        config.game_type = game_type.into();
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if let Some(time) = args.max_time {
        config.max_time = time;
    }
    if let Some(turns) = args.max_turns {
        config.max_turns = Some(turns);
    }
    if let Some(time) = args.max_game_time {
        config.max_game_time = Some(time);
    }
    if let Some(dim) = args.dim {
        config.dim = dim;
    }
    if args.no_alpha_beta {
        config.alpha_beta = false;
    }
    if args.randomize {
        config.randomize_moves = true;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.broker.is_some() {
        config.broker = args.broker.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Play until the rules (or a forfeit) end the game
fn play_game<R: BufRead, W: Write>(
    config: GameConfig,
    broker: Option<&Broker>,
    transcript: &mut Transcript,
    input: &mut R,
    output: &mut W,
) -> Result<GameEnd> {
    let mut ai = AlphaBetaAI::from_config(&config);
    let mut game = GameState::new(config);
    transcript.header(game.config())?;

    let end = loop {
        writeln!(output)?;
        writeln!(output, "{}", game)?;
        transcript.board(&game)?;

        if let Some(winner) = game.winner() {
            break GameEnd {
                winner,
                reason: EndReason::Rules,
                turns: game.turns_played(),
            };
        }

        let turn_start = Instant::now();
        let forfeit = if game.config().game_type.is_human(game.next_player()) {
            match broker {
                Some(broker) => broker_turn(&mut game, broker, transcript, output)?,
                None => human_turn(&mut game, transcript, input, output)?,
            }
            None
        } else {
            computer_turn(&mut game, &mut ai, broker, transcript, output)?
        };
        game.record_elapsed(turn_start.elapsed());

        if let Some(end) = forfeit {
            break end;
        }
    };

    report_end(&game, &end, transcript, output)?;
    Ok(end)
}

/// Print and log the final summary
fn report_end<W: Write>(game: &GameState, end: &GameEnd, transcript: &mut Transcript, output: &mut W) -> Result<()> {
    let mut lines = Vec::new();
    match &end.reason {
        EndReason::Rules => {}
        EndReason::NoMoves => lines.push(format!(
            "Computer {} doesn't know what to do!",
            end.winner.opponent()
        )),
        EndReason::IllegalMove(e) => lines.push(format!(
            "{} loses! The action performed is not valid: {}",
            end.winner.opponent(),
            e
        )),
    }
    lines.push(format!("{} wins in {} turns!", end.winner, end.turns));
    lines.extend(stats_lines(game));

    for line in &lines {
        writeln!(output, "{}", line)?;
        transcript.line(line)?;
    }

    tracing::info!("Game over: {} wins after {} turns ({:?})", end.winner, end.turns, end.reason);
    Ok(())
}

// ============================================================================
// LEVEL 3 - TURNS
// ============================================================================

/// Read moves until one is legal, then play it
fn human_turn<R: BufRead, W: Write>(
    game: &mut GameState,
    transcript: &mut Transcript,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let player = game.next_player();
    loop {
        let Some(mv) = input::read_move(input, output, player)? else {
            bail!("Input closed while waiting for {}'s move", player);
        };

        match game.apply_action(mv) {
            Ok(report) => {
                writeln!(output, "Player {}: {} ({})", player, mv, describe(report.kind))?;
                for event in &report.events {
                    writeln!(output, "  {}", event)?;
                }
                transcript.action(player, "Player", &report)?;
                game.advance_turn();
                return Ok(());
            }
            Err(e) => writeln!(output, "The move is not valid: {}. Try again.", e)?,
        }
    }
}

/// Wait for the remote side's move on the broker and play it
fn broker_turn<W: Write>(
    game: &mut GameState,
    broker: &Broker,
    transcript: &mut Transcript,
    output: &mut W,
) -> Result<()> {
    let player = game.next_player();
    let turn = game.turns_played() + 1;
    writeln!(output, "Getting next move with auto-retry from game broker...")?;
    loop {
        let mv = broker.wait_for_move(turn);
        match game.apply_action(mv) {
            Ok(report) => {
                writeln!(output, "Broker {}: {} ({})", player, mv, describe(report.kind))?;
                for event in &report.events {
                    writeln!(output, "  {}", event)?;
                }
                transcript.action(player, "Broker", &report)?;
                game.advance_turn();
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Broker move {} for turn {} is not valid: {}", mv, turn, e);
                thread::sleep(broker::POLL_INTERVAL);
            }
        }
    }
}

/// Let the AI pick and play a move; returns the game end if it forfeits
fn computer_turn<W: Write>(
    game: &mut GameState,
    ai: &mut AlphaBetaAI,
    broker: Option<&Broker>,
    transcript: &mut Transcript,
    output: &mut W,
) -> Result<Option<GameEnd>> {
    let player = game.next_player();
    writeln!(output, "Computer {} is calculating...", player)?;

    let outcome = ai.search(game);
    let turns = game.turns_played();
    let forfeit = |reason| GameEnd {
        winner: player.opponent(),
        reason,
        turns,
    };

    let Some(mv) = outcome.best_move else {
        return Ok(Some(forfeit(EndReason::NoMoves)));
    };

    match game.apply_action(mv) {
        Ok(report) => {
            writeln!(
                output,
                "Computer {}: {} ({}), score {}, {} evaluations in {:.3}s{}",
                player,
                mv,
                describe(report.kind),
                outcome.score,
                outcome.nodes,
                outcome.elapsed.as_secs_f64(),
                if outcome.timed_out { ", cut short by time" } else { "" }
            )?;
            for event in &report.events {
                writeln!(output, "  {}", event)?;
            }
            transcript.action(player, "Computer", &report)?;
            transcript.line(&format!("Search took {:.3}s", outcome.elapsed.as_secs_f64()))?;
            game.advance_turn();
            if let Some(broker) = broker {
                if let Err(e) = broker.post_move(mv, game.turns_played()) {
                    tracing::warn!("Broker error: {:#}", e);
                }
            }
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Computer {} produced an illegal move {}: {}", player, mv, e);
            Ok(Some(forfeit(EndReason::IllegalMove(e))))
        }
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn stats_lines(game: &GameState) -> Vec<String> {
    let stats = game.stats();
    let mut lines = vec![format!("Total heuristic evaluations: {}", stats.evaluations())];

    let per_depth = stats.evaluations_per_depth();
    if !per_depth.is_empty() {
        let counts: Vec<String> = per_depth
            .iter()
            .map(|(depth, count)| format!("{}={}", depth, count))
            .collect();
        lines.push(format!("Evaluations by depth: {}", counts.join(" ")));
    }
    if let Some(average) = stats.average_search_time() {
        lines.push(format!(
            "Search time: {:.3}s total, {:.3}s average",
            stats.search_time().as_secs_f64(),
            average.as_secs_f64()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn args() -> PlayArgs {
        PlayArgs {
            config: None,
            game_type: None,
            max_depth: None,
            max_time: None,
            max_turns: None,
            max_game_time: None,
            dim: None,
            no_alpha_beta: false,
            randomize: false,
            seed: None,
            broker: None,
            log: PathBuf::from("log.txt"),
            no_log: true,
        }
    }

    #[test]
    fn test_build_config_overrides() {
        let args = PlayArgs {
            game_type: Some(GameTypeArg::Auto),
            max_depth: Some(2),
            max_turns: Some(8),
            no_alpha_beta: true,
            ..args()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.game_type, GameType::CompVsComp);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.max_turns, Some(8));
        assert!(!config.alpha_beta);
        assert_eq!(config.dim, 5);
    }

    #[test]
    fn test_build_config_rejects_bad_dim() {
        let args = PlayArgs { dim: Some(2), ..args() };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_computer_game_finishes() {
        let config = GameConfig {
            game_type: GameType::CompVsComp,
            max_depth: 2,
            max_turns: Some(6),
            ..Default::default()
        };
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let end = play_game(config, None, &mut Transcript::disabled(), &mut input, &mut output).unwrap();

        assert!(end.turns <= 6);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("wins in"));
        assert!(text.contains("Total heuristic evaluations"));
        assert!(text.contains("s average"));
    }

    #[test]
    fn test_broker_relays_both_sides() {
        use crate::broker::tests::{reply, serve};

        let config = GameConfig {
            game_type: GameType::AttackerVsComp,
            max_depth: 1,
            max_turns: Some(2),
            ..Default::default()
        };
        // Attacker's move arrives on the second poll; then the Defender's move is posted and echoed
        let stale = serde_json::json!({ "success": true, "data": null }).to_string();
        let mut bodies = vec![stale, reply("C4 B4", 1)];

        let mut expected = GameState::new(config.clone());
        expected.apply_action("C4 B4".parse().unwrap()).unwrap();
        expected.advance_turn();
        let defender_move = AlphaBetaAI::from_config(&config).suggest_move(&expected).unwrap();
        bodies.push(reply(&defender_move.to_string(), 2));

        let (url, server) = serve(bodies);
        let broker = Broker::new(url);
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let end = play_game(config, Some(&broker), &mut Transcript::disabled(), &mut input, &mut output).unwrap();

        assert_eq!(end.turns, 2);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Broker Attacker: C4 B4 (move)"));

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].starts_with("POST /move"));
        assert!(requests[2].contains(r#""turn":2"#));
    }

    #[test]
    fn test_human_retries_illegal_moves() {
        let config = GameConfig {
            max_turns: Some(2),
            ..Default::default()
        };
        // Diagonal, then a legal Attacker move, then a legal Defender move
        let mut input = Cursor::new("D4 C3\nC4 B4\nB1 C1\n");
        let mut output = Vec::new();
        let end = play_game(config, None, &mut Transcript::disabled(), &mut input, &mut output).unwrap();

        assert_eq!(end.winner, Player::Defender);
        assert_eq!(end.reason, EndReason::Rules);
        assert_eq!(end.turns, 2);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("The move is not valid"));
        assert!(text.contains("Player Defender: B1 C1 (move)"));
    }

    #[test]
    fn test_human_input_closed() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let result = play_game(GameConfig::default(), None, &mut Transcript::disabled(), &mut input, &mut output);
        assert!(result.is_err());
    }
}

//! Human-readable game transcript

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use wargame_core::{ActionKind, ActionReport, GameConfig, GameState, Player};

/// Append-only narration of a game. A disabled transcript swallows everything.
pub struct Transcript {
    writer: Option<Box<dyn Write>>,
}

impl Transcript {
    /// Append to the file at `path`, creating it if needed
    pub fn open(path: &Path) -> io::Result<Self> {
        let file: File = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self {
            writer: Some(Box::new(writer)),
        }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => {
                writeln!(writer, "{}", text)?;
                writer.flush()
            }
            None => Ok(()),
        }
    }

    pub fn header(&mut self, config: &GameConfig) -> io::Result<()> {
        self.line("START OF THE GAME")?;
        self.line(&format!("Game type: {:?}", config.game_type))?;
        self.line(&format!("Search depth: {}", config.max_depth))?;
        self.line(&format!("Search time per move: {}s", config.max_time))?;
        self.line(&format!("Alpha-beta: {}", config.alpha_beta))?;
        match config.max_turns {
            Some(turns) => self.line(&format!("Max turns: {}", turns))?,
            None => self.line("Max turns: unlimited")?,
        }
        self.line("")
    }

    pub fn board(&mut self, state: &GameState) -> io::Result<()> {
        self.line(&state.to_string())
    }

    pub fn action(&mut self, player: Player, source: &str, report: &ActionReport) -> io::Result<()> {
        self.line(&format!("{} {}: {} ({})", source, player, report.pair, describe(report.kind)))?;
        for event in &report.events {
            self.line(&format!("  {}", event))?;
        }
        Ok(())
    }
}

pub fn describe(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Move => "move",
        ActionKind::Attack => "attack",
        ActionKind::Repair => "repair",
        ActionKind::SelfDestruct => "self-destruct",
    }
}

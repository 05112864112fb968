//! Keyboard move source

use std::io::{BufRead, Write};

use anyhow::Result;
use wargame_core::{CoordPair, Player};

/// Prompt until a well-formed coordinate pair is entered.
/// Returns `None` when the input is exhausted.
pub fn read_move<R: BufRead, W: Write>(input: &mut R, output: &mut W, player: Player) -> Result<Option<CoordPair>> {
    loop {
        write!(output, "Player {}, enter your move: ", player)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.parse::<CoordPair>() {
            Ok(pair) => return Ok(Some(pair)),
            Err(e) => writeln!(output, "Invalid coordinates ({}). Try again.", e)?,
        }
    }
}

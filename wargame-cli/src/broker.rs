//! Game broker relay - trade moves with a remote opponent over HTTP
//!
//! The broker holds the latest move as `{from: {row, col}, to: {row, col}, turn}`.
//! GET returns `{success, data}`; POST stores a move and echoes it back in `data`.

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use wargame_core::{Coord, CoordPair};

/// Wait between polls for the opponent's move
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A move as stored by the broker. `turn` counts from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerMove {
    pub from: Coord,
    pub to: Coord,
    pub turn: u32,
}

impl BrokerMove {
    pub fn new(pair: CoordPair, turn: u32) -> Self {
        Self {
            from: pair.src,
            to: pair.dst,
            turn,
        }
    }

    pub fn pair(&self) -> CoordPair {
        CoordPair::new(self.from, self.to)
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    success: bool,
    data: Option<BrokerMove>,
}

pub struct Broker {
    url: String,
    agent: ureq::Agent,
}

impl Broker {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Publish a locally played move; the broker must echo it back
    pub fn post_move(&self, pair: CoordPair, turn: u32) -> Result<()> {
        let data = BrokerMove::new(pair, turn);
        let reply: Reply = self
            .agent
            .post(&self.url)
            .send_json(data)
            .with_context(|| format!("POST {}", self.url))?
            .into_json()
            .context("Malformed broker reply")?;

        if !reply.success || reply.data != Some(data) {
            bail!("Broker did not accept {} for turn {}", pair, turn);
        }
        Ok(())
    }

    /// The move for `turn`, or `None` while the broker still holds an older one
    pub fn fetch_move(&self, turn: u32) -> Result<Option<CoordPair>> {
        let reply: Reply = self
            .agent
            .get(&self.url)
            .set("Accept", "application/json")
            .call()
            .with_context(|| format!("GET {}", self.url))?
            .into_json()
            .context("Malformed broker reply")?;

        if !reply.success {
            bail!("Broker reported failure");
        }
        Ok(reply.data.filter(|mv| mv.turn == turn).map(|mv| mv.pair()))
    }

    /// Poll until the move for `turn` arrives. Failures are logged and retried.
    pub fn wait_for_move(&self, turn: u32) -> CoordPair {
        loop {
            match self.fetch_move(turn) {
                Ok(Some(pair)) => return pair,
                Ok(None) => {}
                Err(e) => tracing::warn!("Broker error: {:#}", e),
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

//! Game engines.
//!
//! Each engine is pure round logic over an injected random source. Engines
//! never touch the ledger; they report what happened and how much the round
//! credits or debits, and `settlement` applies it.
//!
//! - Dice
//! - Coinflip
//! - Blackjack
//! - Slots
//! - Rock-Paper-Scissors
//! - High-Low

pub mod blackjack;
pub mod coinflip;
pub mod dice;
pub mod highlow;
pub mod rps;
pub mod slots;

use serde::{Deserialize, Serialize};

/// Base multiplier in basis points (1.0 = 10000)
pub const BASE_MULTIPLIER: i64 = 10_000;

/// Terminal result of a round from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Tie => "tie",
        }
    }
}

/// `bet * multiplier_bps / 10000`, truncated toward zero.
pub fn apply_multiplier(bet: i64, multiplier_bps: i64) -> i64 {
    bet.saturating_mul(multiplier_bps) / BASE_MULTIPLIER
}

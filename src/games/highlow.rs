//! High-Low: guess whether the next card ranks higher or lower.
//!
//! Ranks run 2..=14 (J=11, Q=12, K=13, A=14) and both cards are drawn
//! independently, so equal ranks are possible; they count as a loss. The bet
//! is taken up front. A win credits `bet * pay_table[distance]`, truncated.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{apply_multiplier, Outcome};
use crate::error::CasinoError;

pub const LOWEST_RANK: u8 = 2;
pub const HIGHEST_RANK: u8 = 14;

/// Win multipliers in basis points, indexed by rank distance (1..=12).
const PAY_TABLE: [i64; 13] = [
    0,       // distance 0 never wins
    10_000,  // 1.0x
    12_000,  // 1.2x
    14_000,  // 1.4x
    16_000,  // 1.6x
    18_000,  // 1.8x
    20_000,  // 2.0x
    25_000,  // 2.5x
    30_000,  // 3.0x
    40_000,  // 4.0x
    50_000,  // 5.0x
    70_000,  // 7.0x
    150_000, // 15.0x
];

pub fn pay_multiplier(distance: u8) -> i64 {
    PAY_TABLE.get(distance as usize).copied().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card(pub u8);

impl Card {
    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        match self.0 {
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            14 => "A".to_string(),
            n => n.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn draw_card<R: Rng + ?Sized>(rng: &mut R) -> Card {
    Card(rng.gen_range(LOWEST_RANK..=HIGHEST_RANK))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guess {
    Higher,
    Lower,
}

impl FromStr for Guess {
    type Err = CasinoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "higher" | "high" | "🔼" => Ok(Guess::Higher),
            "lower" | "low" | "🔽" => Ok(Guess::Lower),
            _ => Err(CasinoError::InvalidChoice(format!(
                "{} (choose 'higher' or 'lower')",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighLowRound {
    pub current: String,
    pub next: String,
    pub guess: Guess,
    pub outcome: Outcome,
    pub distance: u8,
    pub multiplier_bps: i64,
    /// Amount credited; the bet was already taken.
    pub payout: i64,
}

pub fn play<R: Rng + ?Sized>(rng: &mut R, current: Card, guess: Guess, bet: i64) -> HighLowRound {
    resolve(current, draw_card(rng), guess, bet)
}

pub fn resolve(current: Card, next: Card, guess: Guess, bet: i64) -> HighLowRound {
    let won = match guess {
        Guess::Higher => next.rank() > current.rank(),
        Guess::Lower => next.rank() < current.rank(),
    };
    let distance = current.rank().abs_diff(next.rank());
    let multiplier_bps = if won { pay_multiplier(distance) } else { 0 };

    HighLowRound {
        current: current.label(),
        next: next.label(),
        guess,
        outcome: if won { Outcome::Win } else { Outcome::Loss },
        distance,
        multiplier_bps,
        payout: apply_multiplier(bet, multiplier_bps),
    }
}

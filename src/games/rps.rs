//! Rock-paper-scissors against the bot.
//!
//! The bet is taken when the game opens. A win credits 2x, a tie returns the
//! bet, a loss credits nothing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Outcome;
use crate::error::CasinoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Move::Rock => "🪨",
            Move::Paper => "📄",
            Move::Scissors => "✂️",
        }
    }
}

impl FromStr for Move {
    type Err = CasinoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rock" | "🪨" => Ok(Move::Rock),
            "paper" | "📄" => Ok(Move::Paper),
            "scissors" | "✂️" | "✂" => Ok(Move::Scissors),
            _ => Err(CasinoError::InvalidChoice(format!(
                "{} (choose rock, paper or scissors)",
                s
            ))),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

pub fn determine(player: Move, bot: Move) -> Outcome {
    if player == bot {
        Outcome::Tie
    } else if player.beats() == bot {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RpsRound {
    pub player: Move,
    pub bot: Move,
    pub outcome: Outcome,
    /// Amount credited back; the bet was already taken.
    pub payout: i64,
}

pub fn play<R: Rng + ?Sized>(rng: &mut R, player: Move, bet: i64) -> RpsRound {
    let bot = Move::ALL[rng.gen_range(0..Move::ALL.len())];
    resolve(player, bot, bet)
}

pub fn resolve(player: Move, bot: Move, bet: i64) -> RpsRound {
    let outcome = determine(player, bot);
    let payout = match outcome {
        Outcome::Win => bet * 2,
        Outcome::Tie => bet,
        Outcome::Loss => 0,
    };
    RpsRound { player, bot, outcome, payout }
}

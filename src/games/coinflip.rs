//! Coinflip: call heads or tails, a correct call wins even money.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Outcome;
use crate::error::CasinoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl FromStr for CoinSide {
    type Err = CasinoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heads" => Ok(CoinSide::Heads),
            "tails" => Ok(CoinSide::Tails),
            _ => Err(CasinoError::InvalidChoice(format!(
                "{} (choose either 'heads' or 'tails')",
                s
            ))),
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoinFlip {
    pub choice: CoinSide,
    pub landed: CoinSide,
    pub outcome: Outcome,
    pub delta: i64,
}

pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> CoinSide {
    if rng.gen_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    }
}

pub fn play<R: Rng + ?Sized>(rng: &mut R, choice: CoinSide, bet: i64) -> CoinFlip {
    resolve(choice, flip(rng), bet)
}

pub fn resolve(choice: CoinSide, landed: CoinSide, bet: i64) -> CoinFlip {
    let (outcome, delta) = if choice == landed {
        (Outcome::Win, bet)
    } else {
        (Outcome::Loss, -bet)
    };
    CoinFlip { choice, landed, outcome, delta }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HEADS".parse::<CoinSide>().unwrap(), CoinSide::Heads);
        assert_eq!(" tails ".parse::<CoinSide>().unwrap(), CoinSide::Tails);
        assert!(matches!(
            "edge".parse::<CoinSide>(),
            Err(CasinoError::InvalidChoice(_))
        ));
    }

    #[test]
    fn test_resolution() {
        let win = resolve(CoinSide::Heads, CoinSide::Heads, 50);
        assert_eq!((win.outcome, win.delta), (Outcome::Win, 50));

        let loss = resolve(CoinSide::Heads, CoinSide::Tails, 50);
        assert_eq!((loss.outcome, loss.delta), (Outcome::Loss, -50));
    }
}

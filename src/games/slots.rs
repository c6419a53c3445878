//! Slots: three reels over six symbols, three of a kind wins.
//!
//! The bet is not taken up front. A win credits `bet * multiplier`, a loss
//! debits the bet. The first spin pays 2.0x; a "play again" spin pays 1.5x
//! after a win and 2.0x after a loss.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{apply_multiplier, Outcome};

pub const FIRST_SPIN_MULTIPLIER: i64 = 20_000;
pub const AFTER_WIN_MULTIPLIER: i64 = 15_000;
pub const AFTER_LOSS_MULTIPLIER: i64 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Cherry,
    Lemon,
    Watermelon,
    Star,
    Bell,
    Grapes,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Watermelon,
        Symbol::Star,
        Symbol::Bell,
        Symbol::Grapes,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Cherry => "🍒",
            Symbol::Lemon => "🍋",
            Symbol::Watermelon => "🍉",
            Symbol::Star => "⭐",
            Symbol::Bell => "🔔",
            Symbol::Grapes => "🍇",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spin {
    pub reels: [Symbol; 3],
    pub outcome: Outcome,
    pub multiplier_bps: i64,
    /// Net balance change for the spin.
    pub delta: i64,
    /// Multiplier a "play again" spin will use.
    pub next_multiplier_bps: i64,
}

impl Spin {
    pub fn reels_display(&self) -> String {
        self.reels
            .iter()
            .map(|s| s.emoji())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

pub fn spin_reels<R: Rng + ?Sized>(rng: &mut R) -> [Symbol; 3] {
    [pick(rng), pick(rng), pick(rng)]
}

fn pick<R: Rng + ?Sized>(rng: &mut R) -> Symbol {
    *Symbol::ALL.choose(rng).unwrap_or(&Symbol::Cherry)
}

pub fn play<R: Rng + ?Sized>(rng: &mut R, bet: i64, multiplier_bps: i64) -> Spin {
    resolve(spin_reels(rng), bet, multiplier_bps)
}

pub fn resolve(reels: [Symbol; 3], bet: i64, multiplier_bps: i64) -> Spin {
    let won = reels[0] == reels[1] && reels[1] == reels[2];
    if won {
        Spin {
            reels,
            outcome: Outcome::Win,
            multiplier_bps,
            delta: apply_multiplier(bet, multiplier_bps),
            next_multiplier_bps: AFTER_WIN_MULTIPLIER,
        }
    } else {
        Spin {
            reels,
            outcome: Outcome::Loss,
            multiplier_bps,
            delta: -bet,
            next_multiplier_bps: AFTER_LOSS_MULTIPLIER,
        }
    }
}

//! Dice: player and bot each roll one die. Matching rolls win even money.

use rand::Rng;
use serde::Serialize;

use super::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub player: u8,
    pub bot: u8,
    pub outcome: Outcome,
    /// Net balance change for the round.
    pub delta: i64,
}

/// Roll a single die (1-6).
pub fn roll_die<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=6)
}

pub fn play<R: Rng + ?Sized>(rng: &mut R, bet: i64) -> DiceRoll {
    let player = roll_die(rng);
    let bot = roll_die(rng);
    resolve(player, bot, bet)
}

pub fn resolve(player: u8, bot: u8, bet: i64) -> DiceRoll {
    let (outcome, delta) = if player == bot {
        (Outcome::Win, bet)
    } else {
        (Outcome::Loss, -bet)
    };
    DiceRoll { player, bot, outcome, delta }
}

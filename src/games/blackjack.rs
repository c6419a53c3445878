//! Simplified blackjack against the bot.
//!
//! Every draw is a value uniform in 1..=11; there is no deck, no suits and no
//! soft aces. The player hits until they bust or stand; on stand the dealer
//! draws while below 17. The bet is taken when the game opens, so settlement
//! only ever credits: 2x on a win and nothing otherwise. A push keeps the bet.

use rand::Rng;
use serde::Serialize;

use super::Outcome;

pub const BUST_LIMIT: u32 = 21;
pub const DEALER_STANDS_AT: u32 = 17;

/// Draw one card value (1-11).
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=11)
}

pub fn hand_total(hand: &[u8]) -> u32 {
    hand.iter().map(|&v| v as u32).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player,
    Dealer,
    Push,
}

impl Winner {
    pub fn outcome(self) -> Outcome {
        match self {
            Winner::Player => Outcome::Win,
            Winner::Dealer => Outcome::Loss,
            Winner::Push => Outcome::Tie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackjackGame {
    pub bet: i64,
    pub player_hand: Vec<u8>,
    pub dealer_hand: Vec<u8>,
    pub game_over: bool,
}

impl BlackjackGame {
    pub fn deal<R: Rng + ?Sized>(rng: &mut R, bet: i64) -> Self {
        let player_hand = vec![draw(rng), draw(rng)];
        let dealer_hand = vec![draw(rng), draw(rng)];
        Self::from_hands(bet, player_hand, dealer_hand)
    }

    /// A dealt pair over 21 (two elevens) is already a bust.
    pub fn from_hands(bet: i64, player_hand: Vec<u8>, dealer_hand: Vec<u8>) -> Self {
        let game_over = hand_total(&player_hand) > BUST_LIMIT;
        Self {
            bet,
            player_hand,
            dealer_hand,
            game_over,
        }
    }

    pub fn player_total(&self) -> u32 {
        hand_total(&self.player_hand)
    }

    pub fn dealer_total(&self) -> u32 {
        hand_total(&self.dealer_hand)
    }

    /// Take one card. Busting ends the game.
    pub fn hit<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.take(draw(rng));
    }

    pub fn take(&mut self, card: u8) {
        self.player_hand.push(card);
        if self.player_total() > BUST_LIMIT {
            self.game_over = true;
        }
    }

    /// Dealer draws to 17 or more, then the game is over.
    pub fn stand<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while self.dealer_total() < DEALER_STANDS_AT {
            self.dealer_hand.push(draw(rng));
        }
        self.game_over = true;
    }

    pub fn winner(&self) -> Winner {
        let player = self.player_total();
        let dealer = self.dealer_total();
        if player > BUST_LIMIT {
            Winner::Dealer
        } else if dealer > BUST_LIMIT || player > dealer {
            Winner::Player
        } else if player < dealer {
            Winner::Dealer
        } else {
            Winner::Push
        }
    }

    /// Amount credited back when the game ends.
    pub fn payout(&self) -> i64 {
        match self.winner() {
            Winner::Player => self.bet * 2,
            Winner::Push | Winner::Dealer => 0,
        }
    }

    /// What the player may see: the dealer's hole card stays hidden until the end.
    pub fn view(&self) -> BlackjackView {
        let dealer_hand = if self.game_over {
            self.dealer_hand.clone()
        } else {
            self.dealer_hand.iter().take(1).copied().collect()
        };
        BlackjackView {
            bet: self.bet,
            player_hand: self.player_hand.clone(),
            player_total: self.player_total(),
            dealer_hand,
            dealer_total: self.game_over.then(|| self.dealer_total()),
            game_over: self.game_over,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlackjackView {
    pub bet: i64,
    pub player_hand: Vec<u8>,
    pub player_total: u32,
    pub dealer_hand: Vec<u8>,
    pub dealer_total: Option<u32>,
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_player_bust_loses_even_if_dealer_busts() {
        let mut game = BlackjackGame::from_hands(10, vec![10, 9], vec![10, 10, 5]);
        game.take(5);
        assert!(game.game_over);
        assert_eq!(game.winner(), Winner::Dealer);
        assert_eq!(game.payout(), 0);
    }

    #[test]
    fn test_dealer_draws_until_seventeen() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut game = BlackjackGame::deal(&mut rng, 10);
            let before = game.dealer_hand.len();
            let started_at = game.dealer_total();
            game.stand(&mut rng);
            assert!(game.game_over);
            assert!(game.dealer_total() >= DEALER_STANDS_AT);
            if started_at >= DEALER_STANDS_AT {
                assert_eq!(game.dealer_hand.len(), before);
            }
            // the last draw was taken from below 17
            if game.dealer_hand.len() > before {
                let without_last = hand_total(&game.dealer_hand[..game.dealer_hand.len() - 1]);
                assert!(without_last < DEALER_STANDS_AT);
            }
        }
    }

    #[test]
    fn test_winner_rules() {
        let mut higher = BlackjackGame::from_hands(10, vec![10, 9], vec![10, 8]);
        higher.game_over = true;
        assert_eq!(higher.winner(), Winner::Player);
        assert_eq!(higher.payout(), 20);

        let dealer_bust = BlackjackGame::from_hands(10, vec![5, 5], vec![10, 8, 9]);
        assert_eq!(dealer_bust.winner(), Winner::Player);

        let lower = BlackjackGame::from_hands(10, vec![10, 6], vec![10, 8]);
        assert_eq!(lower.winner(), Winner::Dealer);

        let push = BlackjackGame::from_hands(10, vec![10, 8], vec![9, 9]);
        assert_eq!(push.winner(), Winner::Push);
        assert_eq!(push.payout(), 0);
    }

    #[test]
    fn test_double_eleven_deal_is_bust() {
        let game = BlackjackGame::from_hands(10, vec![11, 11], vec![2, 2]);
        assert!(game.game_over);
        assert_eq!(game.winner(), Winner::Dealer);
    }

    #[test]
    fn test_view_hides_hole_card() {
        let mut game = BlackjackGame::from_hands(10, vec![2, 3], vec![7, 11]);
        let view = game.view();
        assert_eq!(view.dealer_hand, vec![7]);
        assert_eq!(view.dealer_total, None);

        game.game_over = true;
        let view = game.view();
        assert_eq!(view.dealer_hand, vec![7, 11]);
        assert_eq!(view.dealer_total, Some(18));
    }
}

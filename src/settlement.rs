//! Settlement: validate a wager, run a game engine, apply the result.
//!
//! Every operation runs under a single lock on `AppState` without awaiting, so
//! the balance change, the transaction entry and its write to disk cannot
//! interleave with another handler or with the auto-save task.

use rand::Rng;
use serde::Serialize;
use tracing::error;

use crate::app_state::AppState;
use crate::error::{CasinoError, CasinoResult};
use crate::games::blackjack::{BlackjackGame, BlackjackView, Winner};
use crate::games::coinflip::{self, CoinFlip, CoinSide};
use crate::games::dice::{self, DiceRoll};
use crate::games::highlow::{self, Guess, HighLowRound};
use crate::games::rps::{self, Move, RpsRound};
use crate::games::slots::{self, Spin, FIRST_SPIN_MULTIPLIER};
use crate::games::Outcome;
use crate::sessions::{GameKind, HighLowSession, Rematch, RpsSession};

/// A finished round plus the player's balance afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Settled<T> {
    #[serde(flatten)]
    pub round: T,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotsResult {
    #[serde(flatten)]
    pub spin: Spin,
    pub display: String,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlackjackState {
    #[serde(flatten)]
    pub hand: BlackjackView,
    pub winner: Option<Winner>,
    pub outcome: Option<Outcome>,
    /// Credited when the game ends (bet already taken).
    pub payout: Option<i64>,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpsOpened {
    pub bet: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HighLowOpened {
    pub bet: i64,
    pub card: String,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Adjustment {
    pub user_id: String,
    pub action: String,
    pub amount: i64,
    pub balance: i64,
}

impl AppState {
    fn record(&mut self, user: &str, description: String) {
        if let Err(e) = self.ledger.record_transaction(user, description) {
            error!("Failed to persist transaction for {}: {}", user, e);
        }
    }

    fn validate_wager(&self, user: &str, bet: i64) -> CasinoResult<()> {
        self.ledger.validate_wager(user, bet, self.max_bet)
    }

    // ===== DICE =====

    pub fn play_dice<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64) -> CasinoResult<Settled<DiceRoll>> {
        self.validate_wager(user, bet)?;

        let roll = dice::play(rng, bet);
        let balance = self.ledger.adjust_balance(user, roll.delta);
        let description = match roll.outcome {
            Outcome::Win => format!("Rolled {}, Bot rolled {}. Won ${}", roll.player, roll.bot, bet * 2),
            _ => format!("Rolled {}, Bot rolled {}. Lost ${}", roll.player, roll.bot, bet),
        };
        self.record(user, description);
        self.log_activity("🎲", "DICE", &format!("{} bet ${} -> {} ({:+})", user, bet, roll.outcome.label(), roll.delta));

        Ok(Settled { round: roll, balance })
    }

    // ===== COINFLIP =====

    pub fn play_coinflip<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64, choice: &str) -> CasinoResult<Settled<CoinFlip>> {
        let choice: CoinSide = choice.parse()?;
        self.validate_wager(user, bet)?;

        let flip = coinflip::play(rng, choice, bet);
        let balance = self.ledger.adjust_balance(user, flip.delta);
        let description = match flip.outcome {
            Outcome::Win => format!("Bet on {}, landed {}. Won ${}", flip.choice, flip.landed, bet * 2),
            _ => format!("Bet on {}, landed {}. Lost ${}", flip.choice, flip.landed, bet),
        };
        self.record(user, description);
        self.log_activity("🪙", "COINFLIP", &format!("{} bet ${} on {} -> {}", user, bet, flip.choice, flip.landed));

        Ok(Settled { round: flip, balance })
    }

    // ===== BLACKJACK =====

    pub fn start_blackjack<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64) -> CasinoResult<BlackjackState> {
        self.validate_wager(user, bet)?;

        let game = BlackjackGame::deal(rng, bet);
        let balance = self.ledger.adjust_balance(user, -bet);
        self.log_activity("🃏", "BLACKJACK", &format!("{} opened a ${} hand", user, bet));

        if game.game_over {
            return Ok(self.finish_blackjack(user, game));
        }

        let hand = game.view();
        self.sessions.start_blackjack(user, game);
        Ok(BlackjackState { hand, winner: None, outcome: None, payout: None, balance })
    }

    pub fn blackjack_hit<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str) -> CasinoResult<BlackjackState> {
        let game = self
            .sessions
            .blackjack_mut(user)
            .ok_or(CasinoError::NoActiveSession(GameKind::Blackjack))?;
        game.hit(rng);

        if game.game_over {
            let game = self
                .sessions
                .end_blackjack(user)
                .ok_or(CasinoError::NoActiveSession(GameKind::Blackjack))?;
            return Ok(self.finish_blackjack(user, game));
        }

        let hand = game.view();
        Ok(BlackjackState {
            hand,
            winner: None,
            outcome: None,
            payout: None,
            balance: self.ledger.get_balance(user),
        })
    }

    pub fn blackjack_stand<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str) -> CasinoResult<BlackjackState> {
        let mut game = self
            .sessions
            .end_blackjack(user)
            .ok_or(CasinoError::NoActiveSession(GameKind::Blackjack))?;
        game.stand(rng);
        Ok(self.finish_blackjack(user, game))
    }

    fn finish_blackjack(&mut self, user: &str, game: BlackjackGame) -> BlackjackState {
        let winner = game.winner();
        let payout = game.payout();
        let balance = self.ledger.adjust_balance(user, payout);

        let description = match winner {
            Winner::Player => format!("Blackjack win: +${}", payout),
            Winner::Push => "Blackjack tie: bet not returned".to_string(),
            Winner::Dealer => format!("Blackjack loss: -${}", game.bet),
        };
        self.record(user, description);
        self.log_activity(
            "🃏",
            "BLACKJACK",
            &format!("{} {} vs {} -> {:?}", user, game.player_total(), game.dealer_total(), winner),
        );

        BlackjackState {
            hand: game.view(),
            winner: Some(winner),
            outcome: Some(winner.outcome()),
            payout: Some(payout),
            balance,
        }
    }

    // ===== SLOTS =====

    pub fn spin_slots<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64) -> CasinoResult<SlotsResult> {
        self.validate_wager(user, bet)?;
        Ok(self.settle_spin(rng, user, bet, FIRST_SPIN_MULTIPLIER))
    }

    /// Spin again at the stake and multiplier left by the previous spin.
    pub fn spin_slots_again<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str) -> CasinoResult<SlotsResult> {
        let rematch = self
            .sessions
            .peek_rematch(GameKind::Slots, user)
            .ok_or(CasinoError::NoActiveSession(GameKind::Slots))?;
        self.validate_wager(user, rematch.bet)?;

        let multiplier = rematch.multiplier_bps.unwrap_or(FIRST_SPIN_MULTIPLIER);
        Ok(self.settle_spin(rng, user, rematch.bet, multiplier))
    }

    fn settle_spin<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64, multiplier_bps: i64) -> SlotsResult {
        let spin = slots::play(rng, bet, multiplier_bps);
        let display = spin.reels_display();
        let balance = self.ledger.adjust_balance(user, spin.delta);

        let description = match spin.outcome {
            Outcome::Win => format!("Slots {}. Won ${}", display, spin.delta),
            _ => format!("Slots {}. Lost ${}", display, bet),
        };
        self.record(user, description);
        self.sessions.offer_rematch(
            GameKind::Slots,
            user,
            Rematch { bet, multiplier_bps: Some(spin.next_multiplier_bps) },
        );
        self.log_activity("🎰", "SLOTS", &format!("{} {} ({:+})", user, display, spin.delta));

        SlotsResult { spin, display, balance }
    }

    // ===== ROCK PAPER SCISSORS =====

    pub fn start_rps(&mut self, user: &str, bet: i64) -> CasinoResult<RpsOpened> {
        self.validate_wager(user, bet)?;
        Ok(self.open_rps(user, bet))
    }

    pub fn rps_again(&mut self, user: &str) -> CasinoResult<RpsOpened> {
        let rematch = self
            .sessions
            .peek_rematch(GameKind::Rps, user)
            .ok_or(CasinoError::NoActiveSession(GameKind::Rps))?;
        self.validate_wager(user, rematch.bet)?;
        self.sessions.take_rematch(GameKind::Rps, user);
        Ok(self.open_rps(user, rematch.bet))
    }

    fn open_rps(&mut self, user: &str, bet: i64) -> RpsOpened {
        let balance = self.ledger.adjust_balance(user, -bet);
        self.sessions.start_rps(user, RpsSession { bet });
        RpsOpened { bet, balance }
    }

    pub fn play_rps<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, choice: &str) -> CasinoResult<Settled<RpsRound>> {
        let player: Move = choice.parse()?;
        let session = self
            .sessions
            .take_rps(user)
            .ok_or(CasinoError::NoActiveSession(GameKind::Rps))?;

        let round = rps::play(rng, player, session.bet);
        let balance = self.ledger.adjust_balance(user, round.payout);
        let description = match round.outcome {
            Outcome::Win => format!("RPS {} vs {}. Won ${}", round.player, round.bot, round.payout),
            Outcome::Tie => format!("RPS {} vs {}. Tie, ${} returned", round.player, round.bot, session.bet),
            Outcome::Loss => format!("RPS {} vs {}. Lost ${}", round.player, round.bot, session.bet),
        };
        self.record(user, description);
        self.sessions.offer_rematch(GameKind::Rps, user, Rematch { bet: session.bet, multiplier_bps: None });
        self.log_activity(
            "✂️",
            "RPS",
            &format!("{} {} {} vs {} -> {}", user, player.emoji(), player, round.bot, round.outcome.label()),
        );

        Ok(Settled { round, balance })
    }

    // ===== HIGH LOW =====

    pub fn start_highlow<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64) -> CasinoResult<HighLowOpened> {
        self.validate_wager(user, bet)?;
        Ok(self.open_highlow(rng, user, bet))
    }

    pub fn highlow_again<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str) -> CasinoResult<HighLowOpened> {
        let rematch = self
            .sessions
            .peek_rematch(GameKind::HighLow, user)
            .ok_or(CasinoError::NoActiveSession(GameKind::HighLow))?;
        self.validate_wager(user, rematch.bet)?;
        self.sessions.take_rematch(GameKind::HighLow, user);
        Ok(self.open_highlow(rng, user, rematch.bet))
    }

    fn open_highlow<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, bet: i64) -> HighLowOpened {
        let balance = self.ledger.adjust_balance(user, -bet);
        let card = highlow::draw_card(rng);
        self.sessions.start_highlow(user, HighLowSession { bet, card });
        HighLowOpened { bet, card: card.label(), balance }
    }

    pub fn guess_highlow<R: Rng + ?Sized>(&mut self, rng: &mut R, user: &str, guess: &str) -> CasinoResult<Settled<HighLowRound>> {
        let guess: Guess = guess.parse()?;
        let session = self
            .sessions
            .take_highlow(user)
            .ok_or(CasinoError::NoActiveSession(GameKind::HighLow))?;

        let round = highlow::play(rng, session.card, guess, session.bet);
        let balance = self.ledger.adjust_balance(user, round.payout);
        let description = match round.outcome {
            Outcome::Win => format!("High-Low {} -> {}. Won ${}", round.current, round.next, round.payout),
            _ => format!("High-Low {} -> {}. Lost ${}", round.current, round.next, session.bet),
        };
        self.record(user, description);
        self.sessions.offer_rematch(GameKind::HighLow, user, Rematch { bet: session.bet, multiplier_bps: None });
        self.log_activity("🎴", "HIGHLOW", &format!("{} {} -> {} ({})", user, round.current, round.next, round.outcome.label()));

        Ok(Settled { round, balance })
    }

    // ===== ADMIN =====

    pub fn admin_adjust(&mut self, user: &str, action: &str, amount: i64) -> CasinoResult<Adjustment> {
        let action = action.trim().to_lowercase();
        let (delta, verb) = match action.as_str() {
            "increase" => (amount, "increased"),
            "decrease" => (-amount, "decreased"),
            _ => return Err(CasinoError::InvalidAction(action)),
        };
        if amount <= 0 {
            return Err(CasinoError::InvalidAmount);
        }

        let balance = self
            .ledger
            .try_adjust_balance(user, delta)
            .ok_or(CasinoError::InvalidAmount)?;
        self.record(user, format!("Admin {} balance by ${}", verb, amount));
        self.log_activity("🛠️", "ADJUST", &format!("{} {} by ${}", user, verb, amount));

        Ok(Adjustment {
            user_id: user.to_string(),
            action,
            amount,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::Ledger;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn state_with(dir: &TempDir, user: &str, balance: i64) -> AppState {
        let mut ledger = Ledger::new(dir.path().join("b.json"), dir.path().join("t.json"));
        ledger.adjust_balance(user, balance);
        AppState::with_ledger(&Config::default(), ledger)
    }

    #[test]
    fn test_rejected_wager_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(state.play_dice(&mut rng, "u", 0), Err(CasinoError::InvalidBet { .. })));
        assert!(matches!(state.play_dice(&mut rng, "u", 10_001), Err(CasinoError::InvalidBet { .. })));
        assert!(matches!(
            state.play_coinflip(&mut rng, "u", 101, "heads"),
            Err(CasinoError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            state.play_coinflip(&mut rng, "u", 10, "sideways"),
            Err(CasinoError::InvalidChoice(_))
        ));
        assert!(state.start_rps("u", 500).is_err());

        assert_eq!(state.ledger.get_balance("u"), 100);
        assert!(state.ledger.transactions_for("u").is_empty());
        assert_eq!(state.sessions.active_count(), 0);
    }

    #[test]
    fn test_coinflip_scenario() {
        let dir = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let mut saw_win = false;
        let mut saw_loss = false;

        for _ in 0..20 {
            let mut state = state_with(&dir, "u", 100);
            let result = state.play_coinflip(&mut rng, "u", 50, "heads").unwrap();
            match result.round.landed {
                CoinSide::Heads => {
                    saw_win = true;
                    assert_eq!(result.balance, 150);
                    assert_eq!(state.ledger.transactions_for("u"), ["Bet on heads, landed heads. Won $100"]);
                }
                CoinSide::Tails => {
                    saw_loss = true;
                    assert_eq!(result.balance, 50);
                }
            }
        }
        assert!(saw_win && saw_loss);
    }

    #[test]
    fn test_dice_net_change_is_plus_or_minus_bet() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 10_000);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let before = state.ledger.get_balance("u");
            let result = state.play_dice(&mut rng, "u", 20).unwrap();
            let expected = if result.round.player == result.round.bot { 20 } else { -20 };
            assert_eq!(result.balance - before, expected);
        }
        assert_eq!(state.ledger.transactions_for("u").len(), 50);
    }

    #[test]
    fn test_blackjack_takes_bet_then_settles() {
        let dir = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..30 {
            let mut state = state_with(&dir, "u", 100);
            let opened = state.start_blackjack(&mut rng, "u", 40).unwrap();
            let finished = if opened.winner.is_some() {
                opened
            } else {
                assert_eq!(opened.balance, 60);
                assert_eq!(opened.hand.dealer_hand.len(), 1);
                state.blackjack_stand(&mut rng, "u").unwrap()
            };

            let expected = match finished.winner.unwrap() {
                Winner::Player => 140,
                Winner::Push | Winner::Dealer => 60,
            };
            assert_eq!(finished.balance, expected);
            assert!(finished.hand.game_over);
            assert!(matches!(
                state.blackjack_stand(&mut rng, "u"),
                Err(CasinoError::NoActiveSession(GameKind::Blackjack))
            ));
        }
    }

    #[test]
    fn test_admin_adjust_refuses_overflow() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 0);

        state.admin_adjust("u", "increase", i64::MAX).unwrap();
        assert!(matches!(state.admin_adjust("u", "increase", 1), Err(CasinoError::InvalidAmount)));
        assert_eq!(state.ledger.get_balance("u"), i64::MAX);
        assert_eq!(state.ledger.transactions_for("u").len(), 1);

        state.admin_adjust("v", "increase", 5).unwrap();
        assert_eq!(state.ledger.stats().circulating, i64::MAX);
    }

    #[test]
    fn test_blackjack_push_keeps_bet() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100);
        let mut rng = StdRng::seed_from_u64(3);

        state.ledger.adjust_balance("u", -40);
        state
            .sessions
            .start_blackjack("u", BlackjackGame::from_hands(40, vec![10, 8], vec![9, 9]));

        let finished = state.blackjack_stand(&mut rng, "u").unwrap();
        assert_eq!(finished.winner, Some(Winner::Push));
        assert_eq!(finished.payout, Some(0));
        assert_eq!(finished.balance, 60);
        assert_eq!(state.ledger.transactions_for("u"), ["Blackjack tie: bet not returned"]);
    }

    #[test]
    fn test_blackjack_hit_until_bust() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100);
        let mut rng = StdRng::seed_from_u64(2);
        state
            .sessions
            .start_blackjack("u", BlackjackGame::from_hands(30, vec![10, 10], vec![2, 2]));
        state.ledger.adjust_balance("u", -30);

        let mut result = state.blackjack_hit(&mut rng, "u").unwrap();
        while result.winner.is_none() {
            result = state.blackjack_hit(&mut rng, "u").unwrap();
        }
        if result.hand.player_total > 21 {
            assert_eq!(result.winner, Some(Winner::Dealer));
            assert_eq!(result.balance, 70);
            assert_eq!(state.ledger.transactions_for("u"), ["Blackjack loss: -$30"]);
        }
    }

    #[test]
    fn test_rps_flow_and_rematch() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100);
        let mut rng = StdRng::seed_from_u64(8);

        let opened = state.start_rps("u", 30).unwrap();
        assert_eq!(opened.balance, 70);

        assert!(state.play_rps(&mut rng, "u", "lizard").is_err());
        let played = state.play_rps(&mut rng, "u", "rock").unwrap();
        let expected = match played.round.outcome {
            Outcome::Win => 130,
            Outcome::Tie => 100,
            Outcome::Loss => 70,
        };
        assert_eq!(played.balance, expected);
        assert!(state.play_rps(&mut rng, "u", "rock").is_err());

        let again = state.rps_again("u").unwrap();
        assert_eq!(again.bet, 30);
        assert_eq!(again.balance, expected - 30);
        assert!(state.rps_again("u").is_err());
    }

    #[test]
    fn test_highlow_flow() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100);
        let mut rng = StdRng::seed_from_u64(21);

        let opened = state.start_highlow(&mut rng, "u", 10).unwrap();
        assert_eq!(opened.balance, 90);

        let played = state.guess_highlow(&mut rng, "u", "higher").unwrap();
        assert_eq!(played.round.current, opened.card);
        assert_eq!(played.balance, 90 + played.round.payout);
        if played.round.outcome == Outcome::Loss {
            assert_eq!(played.round.payout, 0);
        }

        let again = state.highlow_again(&mut rng, "u").unwrap();
        assert_eq!(again.balance, played.balance - 10);
    }

    #[test]
    fn test_slots_rematch_uses_previous_outcome() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 100_000);
        let mut rng = StdRng::seed_from_u64(4);

        assert!(state.spin_slots_again(&mut rng, "u").is_err());
        let mut last = state.spin_slots(&mut rng, "u", 100).unwrap();
        assert_eq!(last.spin.multiplier_bps, FIRST_SPIN_MULTIPLIER);

        for _ in 0..200 {
            let before = last.balance;
            let next = state.spin_slots_again(&mut rng, "u").unwrap();
            assert_eq!(next.spin.multiplier_bps, last.spin.next_multiplier_bps);
            match next.spin.outcome {
                Outcome::Win => assert_eq!(next.balance - before, 100 * next.spin.multiplier_bps / 10_000),
                _ => assert_eq!(next.balance - before, -100),
            }
            last = next;
        }
    }

    #[test]
    fn test_admin_adjust() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "u", 10);

        let up = state.admin_adjust("u", "Increase", 40).unwrap();
        assert_eq!(up.balance, 50);
        let down = state.admin_adjust("u", "decrease", 80).unwrap();
        assert_eq!(down.balance, -30);
        assert_eq!(
            state.ledger.transactions_for("u"),
            ["Admin increased balance by $40", "Admin decreased balance by $80"]
        );

        assert!(matches!(state.admin_adjust("u", "double", 5), Err(CasinoError::InvalidAction(_))));
        assert!(matches!(state.admin_adjust("u", "increase", 0), Err(CasinoError::InvalidAmount)));
    }
}

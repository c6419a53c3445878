// In-progress multi-step games and "play again" offers, keyed per user and game kind

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::games::blackjack::BlackjackGame;
use crate::games::highlow::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Blackjack,
    Slots,
    Rps,
    HighLow,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Slots => "slots",
            GameKind::Rps => "rock-paper-scissors",
            GameKind::HighLow => "high-low",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpsSession {
    pub bet: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighLowSession {
    pub bet: i64,
    pub card: Card,
}

/// Remembered stake for a "play again".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rematch {
    pub bet: i64,
    /// Slots only: multiplier for the next spin.
    pub multiplier_bps: Option<i64>,
}

#[derive(Debug, Clone)]
struct Timed<T> {
    value: T,
    started_at: Instant,
}

impl<T> Timed<T> {
    fn new(value: T) -> Self {
        Self { value, started_at: Instant::now() }
    }

    fn expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.started_at) >= ttl
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    blackjack: HashMap<String, Timed<BlackjackGame>>,
    rps: HashMap<String, Timed<RpsSession>>,
    highlow: HashMap<String, Timed<HighLowSession>>,
    rematches: HashMap<(GameKind, String), Timed<Rematch>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== BLACKJACK =====

    pub fn start_blackjack(&mut self, user: &str, game: BlackjackGame) {
        if self.blackjack.insert(user.to_string(), Timed::new(game)).is_some() {
            debug!("Replaced stale blackjack session for {}", user);
        }
    }

    pub fn blackjack_mut(&mut self, user: &str) -> Option<&mut BlackjackGame> {
        self.blackjack.get_mut(user).map(|t| &mut t.value)
    }

    pub fn end_blackjack(&mut self, user: &str) -> Option<BlackjackGame> {
        self.blackjack.remove(user).map(|t| t.value)
    }

    // ===== ROCK PAPER SCISSORS =====

    pub fn start_rps(&mut self, user: &str, session: RpsSession) {
        if self.rps.insert(user.to_string(), Timed::new(session)).is_some() {
            debug!("Replaced stale rps session for {}", user);
        }
    }

    pub fn take_rps(&mut self, user: &str) -> Option<RpsSession> {
        self.rps.remove(user).map(|t| t.value)
    }

    // ===== HIGH LOW =====

    pub fn start_highlow(&mut self, user: &str, session: HighLowSession) {
        if self.highlow.insert(user.to_string(), Timed::new(session)).is_some() {
            debug!("Replaced stale high-low session for {}", user);
        }
    }

    pub fn take_highlow(&mut self, user: &str) -> Option<HighLowSession> {
        self.highlow.remove(user).map(|t| t.value)
    }

    // ===== PLAY AGAIN =====

    pub fn offer_rematch(&mut self, kind: GameKind, user: &str, rematch: Rematch) {
        self.rematches.insert((kind, user.to_string()), Timed::new(rematch));
    }

    pub fn peek_rematch(&self, kind: GameKind, user: &str) -> Option<Rematch> {
        self.rematches
            .get(&(kind, user.to_string()))
            .map(|t| t.value)
    }

    pub fn take_rematch(&mut self, kind: GameKind, user: &str) -> Option<Rematch> {
        self.rematches.remove(&(kind, user.to_string())).map(|t| t.value)
    }

    pub fn active_count(&self) -> usize {
        self.blackjack.len() + self.rps.len() + self.highlow.len()
    }

    /// Drop sessions and offers older than `ttl`. Wagers already taken are not refunded.
    pub fn purge_expired(&mut self, ttl: Duration) -> usize {
        self.purge_expired_at(Instant::now(), ttl)
    }

    pub fn purge_expired_at(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.active_count() + self.rematches.len();

        self.blackjack.retain(|user, t| {
            let keep = !t.expired(now, ttl);
            if !keep {
                warn!("Abandoned blackjack game for {} expired (bet ${} forfeited)", user, t.value.bet);
            }
            keep
        });
        self.rps.retain(|user, t| {
            let keep = !t.expired(now, ttl);
            if !keep {
                warn!("Abandoned rps game for {} expired (bet ${} forfeited)", user, t.value.bet);
            }
            keep
        });
        self.highlow.retain(|user, t| {
            let keep = !t.expired(now, ttl);
            if !keep {
                warn!("Abandoned high-low game for {} expired (bet ${} forfeited)", user, t.value.bet);
            }
            keep
        });
        self.rematches.retain(|_, t| !t.expired(now, ttl));

        before - (self.active_count() + self.rematches.len())
    }
}

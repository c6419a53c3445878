// Request bodies for the casino command surface

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerStats;

/// Any game command that only identifies the player (hit, stand, play again)
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetRequest {
    pub user_id: String,
    pub bet: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinflipRequest {
    pub user_id: String,
    pub bet: i64,
    /// "heads" or "tails"
    pub choice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpsMoveRequest {
    pub user_id: String,
    /// "rock", "paper", "scissors" or the matching emoji
    pub choice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighLowGuessRequest {
    pub user_id: String,
    /// "higher" or "lower"
    pub guess: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub user_id: String,
    pub amount: i64,
    pub proof_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub user_id: String,
    pub amount: i64,
    /// In-game name to pay out to
    pub ign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustBalanceRequest {
    pub user_id: String,
    /// "increase" or "decrease"
    pub action: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub reviewer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ledger: LedgerStats,
    pub active_sessions: usize,
    pub pending_requests: usize,
}

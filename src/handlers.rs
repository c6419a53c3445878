// HTTP request handlers for the casino command surface

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::sync::MutexGuard;

use crate::app_state::{AppState, SharedState};
use crate::cashier::CashierRequest;
use crate::error::CasinoResult;
use crate::games::coinflip::CoinFlip;
use crate::games::dice::DiceRoll;
use crate::games::highlow::HighLowRound;
use crate::games::rps::RpsRound;
use crate::models::*;
use crate::settlement::{BlackjackState, HighLowOpened, RpsOpened, Settled, SlotsResult};

/// Success envelope: `{"success": true, ...fields}`
#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub fn reply<T: Serialize>(data: T) -> Json<Reply<T>> {
    Json(Reply { success: true, data })
}

/// Lock the shared state. A panicked handler must not take the ledger down with it.
pub fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ===== HEALTH =====

pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    let app_state = lock(&state);
    Json(HealthResponse {
        status: "ok",
        ledger: app_state.ledger.stats(),
        active_sessions: app_state.sessions.active_count(),
        pending_requests: app_state.cashier.pending().len(),
    })
}

// ===== LEDGER ENDPOINTS =====

#[derive(Debug, Serialize)]
pub struct BalanceBody {
    pub user_id: String,
    pub balance: i64,
}

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Json<Reply<BalanceBody>> {
    let balance = lock(&state).ledger.get_balance(&user_id);
    reply(BalanceBody { user_id, balance })
}

#[derive(Debug, Serialize)]
pub struct TransactionsBody {
    pub user_id: String,
    pub transactions: Vec<String>,
}

pub async fn get_transactions(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Json<Reply<TransactionsBody>> {
    let transactions = lock(&state).ledger.transactions_for(&user_id).to_vec();
    reply(TransactionsBody { user_id, transactions })
}

// ===== SINGLE-SHOT GAMES =====

pub async fn play_dice(
    State(state): State<SharedState>,
    Json(req): Json<BetRequest>,
) -> CasinoResult<Json<Reply<Settled<DiceRoll>>>> {
    let result = lock(&state).play_dice(&mut rand::thread_rng(), &req.user_id, req.bet)?;
    Ok(reply(result))
}

pub async fn play_coinflip(
    State(state): State<SharedState>,
    Json(req): Json<CoinflipRequest>,
) -> CasinoResult<Json<Reply<Settled<CoinFlip>>>> {
    let result = lock(&state).play_coinflip(&mut rand::thread_rng(), &req.user_id, req.bet, &req.choice)?;
    Ok(reply(result))
}

// ===== BLACKJACK =====

pub async fn start_blackjack(
    State(state): State<SharedState>,
    Json(req): Json<BetRequest>,
) -> CasinoResult<Json<Reply<BlackjackState>>> {
    let result = lock(&state).start_blackjack(&mut rand::thread_rng(), &req.user_id, req.bet)?;
    Ok(reply(result))
}

pub async fn blackjack_hit(
    State(state): State<SharedState>,
    Json(req): Json<PlayerRequest>,
) -> CasinoResult<Json<Reply<BlackjackState>>> {
    let result = lock(&state).blackjack_hit(&mut rand::thread_rng(), &req.user_id)?;
    Ok(reply(result))
}

pub async fn blackjack_stand(
    State(state): State<SharedState>,
    Json(req): Json<PlayerRequest>,
) -> CasinoResult<Json<Reply<BlackjackState>>> {
    let result = lock(&state).blackjack_stand(&mut rand::thread_rng(), &req.user_id)?;
    Ok(reply(result))
}

// ===== SLOTS =====

pub async fn spin_slots(
    State(state): State<SharedState>,
    Json(req): Json<BetRequest>,
) -> CasinoResult<Json<Reply<SlotsResult>>> {
    let result = lock(&state).spin_slots(&mut rand::thread_rng(), &req.user_id, req.bet)?;
    Ok(reply(result))
}

pub async fn spin_slots_again(
    State(state): State<SharedState>,
    Json(req): Json<PlayerRequest>,
) -> CasinoResult<Json<Reply<SlotsResult>>> {
    let result = lock(&state).spin_slots_again(&mut rand::thread_rng(), &req.user_id)?;
    Ok(reply(result))
}

// ===== ROCK PAPER SCISSORS =====

pub async fn start_rps(
    State(state): State<SharedState>,
    Json(req): Json<BetRequest>,
) -> CasinoResult<Json<Reply<RpsOpened>>> {
    let result = lock(&state).start_rps(&req.user_id, req.bet)?;
    Ok(reply(result))
}

pub async fn play_rps(
    State(state): State<SharedState>,
    Json(req): Json<RpsMoveRequest>,
) -> CasinoResult<Json<Reply<Settled<RpsRound>>>> {
    let result = lock(&state).play_rps(&mut rand::thread_rng(), &req.user_id, &req.choice)?;
    Ok(reply(result))
}

pub async fn rps_again(
    State(state): State<SharedState>,
    Json(req): Json<PlayerRequest>,
) -> CasinoResult<Json<Reply<RpsOpened>>> {
    let result = lock(&state).rps_again(&req.user_id)?;
    Ok(reply(result))
}

// ===== HIGH LOW =====

pub async fn start_highlow(
    State(state): State<SharedState>,
    Json(req): Json<BetRequest>,
) -> CasinoResult<Json<Reply<HighLowOpened>>> {
    let result = lock(&state).start_highlow(&mut rand::thread_rng(), &req.user_id, req.bet)?;
    Ok(reply(result))
}

pub async fn guess_highlow(
    State(state): State<SharedState>,
    Json(req): Json<HighLowGuessRequest>,
) -> CasinoResult<Json<Reply<Settled<HighLowRound>>>> {
    let result = lock(&state).guess_highlow(&mut rand::thread_rng(), &req.user_id, &req.guess)?;
    Ok(reply(result))
}

pub async fn highlow_again(
    State(state): State<SharedState>,
    Json(req): Json<PlayerRequest>,
) -> CasinoResult<Json<Reply<HighLowOpened>>> {
    let result = lock(&state).highlow_again(&mut rand::thread_rng(), &req.user_id)?;
    Ok(reply(result))
}

// ===== CASHIER =====

pub async fn submit_deposit(
    State(state): State<SharedState>,
    Json(req): Json<DepositRequest>,
) -> CasinoResult<Json<Reply<CashierRequest>>> {
    let request = lock(&state)
        .cashier
        .submit_deposit(&req.user_id, req.amount, &req.proof_url)?;
    Ok(reply(request))
}

pub async fn submit_withdrawal(
    State(state): State<SharedState>,
    Json(req): Json<WithdrawRequest>,
) -> CasinoResult<Json<Reply<CashierRequest>>> {
    let mut app_state = lock(&state);
    let app_state = &mut *app_state;
    let request = app_state
        .cashier
        .submit_withdrawal(&app_state.ledger, &req.user_id, req.amount, &req.ign)?;
    Ok(reply(request))
}

// Staff-only routes: balance adjustment, cashier review, shutdown
// Gated by the shared BOT_TOKEN presented as a bearer token

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{header::AUTHORIZATION, request::Parts},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app_state::SharedState;
use crate::cashier::CashierRequest;
use crate::error::{CasinoError, CasinoResult};
use crate::handlers::{lock, reply, Reply};
use crate::models::{AdjustBalanceRequest, ReviewRequest};
use crate::settlement::Adjustment;

/// Extractor proving the caller holds the admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<SharedState> for AdminAuth {
    type Rejection = CasinoError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or(CasinoError::Unauthorized)?;

        let expected = lock(state).bot_token.clone();
        match expected {
            Some(token) if token == presented => Ok(AdminAuth),
            _ => {
                warn!("Rejected admin request to {}", parts.uri.path());
                Err(CasinoError::Unauthorized)
            }
        }
    }
}

// ===== BALANCE =====

/// POST /admin/adjust
pub async fn adjust_balance(
    _admin: AdminAuth,
    State(state): State<SharedState>,
    Json(req): Json<AdjustBalanceRequest>,
) -> CasinoResult<Json<Reply<Adjustment>>> {
    let result = lock(&state).admin_adjust(&req.user_id, &req.action, req.amount)?;
    Ok(reply(result))
}

// ===== ACTIVITY =====

const DEFAULT_ACTIVITY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ActivityBody {
    pub activity: Vec<String>,
}

/// GET /admin/activity?limit=N
/// Most recent settlement log lines, newest first.
pub async fn activity_feed(
    _admin: AdminAuth,
    State(state): State<SharedState>,
    Query(query): Query<ActivityQuery>,
) -> Json<Reply<ActivityBody>> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    let activity = lock(&state).recent_activity(limit);
    reply(ActivityBody { activity })
}

// ===== CASHIER REVIEW =====

#[derive(Debug, Serialize)]
pub struct PendingBody {
    pub requests: Vec<CashierRequest>,
}

/// GET /admin/requests
pub async fn pending_requests(
    _admin: AdminAuth,
    State(state): State<SharedState>,
) -> Json<Reply<PendingBody>> {
    let requests = lock(&state).cashier.pending().into_iter().cloned().collect();
    reply(PendingBody { requests })
}

/// POST /admin/requests/:id/accept
pub async fn accept_request(
    _admin: AdminAuth,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> CasinoResult<Json<Reply<CashierRequest>>> {
    review(&state, &id, true, body.and_then(|Json(req)| req.reviewer))
}

/// POST /admin/requests/:id/reject
pub async fn reject_request(
    _admin: AdminAuth,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> CasinoResult<Json<Reply<CashierRequest>>> {
    review(&state, &id, false, body.and_then(|Json(req)| req.reviewer))
}

fn review(
    state: &SharedState,
    id: &str,
    approve: bool,
    reviewer: Option<String>,
) -> CasinoResult<Json<Reply<CashierRequest>>> {
    let reviewer = reviewer.unwrap_or_else(|| "staff".to_string());
    let mut app_state = lock(state);
    let app_state = &mut *app_state;
    let request = app_state
        .cashier
        .review(&mut app_state.ledger, id, approve, &reviewer)?;

    let verb = if approve { "accepted" } else { "rejected" };
    app_state.log_activity(
        "🧾",
        "CASHIER",
        &format!("{:?} of ${} for {} {} by {}", request.kind, request.amount, request.user_id, verb, reviewer),
    );
    Ok(reply(request))
}

// ===== SHUTDOWN =====

#[derive(Debug, Serialize)]
pub struct ShutdownBody {
    pub message: &'static str,
}

/// POST /admin/shutdown
/// Flushes the ledger, then lets the server drain and stop.
pub async fn shutdown(
    _admin: AdminAuth,
    State(state): State<SharedState>,
) -> CasinoResult<Json<Reply<ShutdownBody>>> {
    let notify = {
        let app_state = lock(&state);
        app_state.save_to_disk()?;
        app_state.shutdown.clone()
    };
    info!("🔴 Shutdown requested by admin");
    notify.notify_one();
    Ok(reply(ShutdownBody { message: "Shutting down the casino safely..." }))
}

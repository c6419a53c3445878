// Routes module - assembles the HTTP command surface
// Player commands live in handlers.rs, staff commands in admin.rs

pub mod admin;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // ===== LEDGER =====
        .route("/balance/:user_id", get(get_balance))
        .route("/transactions/:user_id", get(get_transactions))

        // ===== GAMES =====
        .route("/games/dice", post(play_dice))
        .route("/games/coinflip", post(play_coinflip))
        .route("/games/blackjack", post(start_blackjack))
        .route("/games/blackjack/hit", post(blackjack_hit))
        .route("/games/blackjack/stand", post(blackjack_stand))
        .route("/games/slots", post(spin_slots))
        .route("/games/slots/again", post(spin_slots_again))
        .route("/games/rps", post(start_rps))
        .route("/games/rps/play", post(play_rps))
        .route("/games/rps/again", post(rps_again))
        .route("/games/highlow", post(start_highlow))
        .route("/games/highlow/guess", post(guess_highlow))
        .route("/games/highlow/again", post(highlow_again))

        // ===== CASHIER =====
        .route("/cashier/deposit", post(submit_deposit))
        .route("/cashier/withdraw", post(submit_withdrawal))

        // ===== ADMIN =====
        .route("/admin/adjust", post(admin::adjust_balance))
        .route("/admin/activity", get(admin::activity_feed))
        .route("/admin/requests", get(admin::pending_requests))
        .route("/admin/requests/:id/accept", post(admin::accept_request))
        .route("/admin/requests/:id/reject", post(admin::reject_request))
        .route("/admin/shutdown", post(admin::shutdown))

        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

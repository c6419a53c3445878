// Error types shared by the ledger, settlement and HTTP layers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::sessions::GameKind;

/// Failures writing the ledger files.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize ledger: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CasinoError {
    #[error("Invalid bet amount! Must be between 1 and ${max}.")]
    InvalidBet { max: i64 },
    #[error("You don't have enough Redmont Dollars (balance ${balance}, needed ${needed}).")]
    InsufficientFunds { balance: i64, needed: i64 },
    #[error("Invalid choice '{0}'")]
    InvalidChoice(String),
    #[error("Amount must be positive!")]
    InvalidAmount,
    #[error("Invalid action '{0}'! Use 'increase' or 'decrease'.")]
    InvalidAction(String),
    #[error("No active {0} game found!")]
    NoActiveSession(GameKind),
    #[error("Request {0} not found")]
    RequestNotFound(String),
    #[error("Request {0} has already been reviewed")]
    AlreadyReviewed(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Persistence(#[from] LedgerError),
}

impl CasinoError {
    pub fn status(&self) -> StatusCode {
        match self {
            CasinoError::InvalidBet { .. }
            | CasinoError::InsufficientFunds { .. }
            | CasinoError::InvalidChoice(_)
            | CasinoError::InvalidAmount
            | CasinoError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            CasinoError::NoActiveSession(_) | CasinoError::RequestNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CasinoError::AlreadyReviewed(_) => StatusCode::CONFLICT,
            CasinoError::Unauthorized => StatusCode::UNAUTHORIZED,
            CasinoError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CasinoError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

pub type CasinoResult<T> = Result<T, CasinoError>;

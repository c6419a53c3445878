/// Redmont casino bot backend
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod autosave;
pub mod cashier;
pub mod config;
pub mod error;
pub mod games;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod sessions;
pub mod settlement;

pub use app_state::{AppState, SharedState};
pub use autosave::AutosaveHandle;
pub use cashier::{Cashier, CashierRequest, RequestKind, RequestStatus};
pub use config::Config;
pub use error::{CasinoError, CasinoResult, LedgerError};
pub use games::{apply_multiplier, Outcome, BASE_MULTIPLIER};
pub use ledger::{Ledger, LedgerStats};
pub use routes::router;
pub use sessions::{GameKind, SessionStore};
pub use settlement::{Adjustment, BlackjackState, HighLowOpened, RpsOpened, Settled, SlotsResult};

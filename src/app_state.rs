// Application state management

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;

use crate::cashier::Cashier;
use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::sessions::SessionStore;

pub type SharedState = Arc<Mutex<AppState>>;

const MAX_ACTIVITY_ENTRIES: usize = 1000;

pub struct AppState {
    pub ledger: Ledger,
    pub sessions: SessionStore,
    pub cashier: Cashier,
    pub max_bet: i64,
    pub session_ttl: Duration,
    pub bot_token: Option<String>,
    /// Recent settlement log lines, newest last. Served by `GET /admin/activity`.
    pub activity: VecDeque<String>,
    /// Fired by the admin shutdown route
    pub shutdown: Arc<Notify>,
}

impl AppState {
    /// Load the ledger from the configured files.
    pub fn new(config: &Config) -> Self {
        info!("🎰 Initializing Redmont casino...");
        let ledger = Ledger::load(&config.balances_file, &config.transactions_file);
        Self::with_ledger(config, ledger)
    }

    pub fn with_ledger(config: &Config, ledger: Ledger) -> Self {
        Self {
            ledger,
            sessions: SessionStore::new(),
            cashier: Cashier::new(),
            max_bet: config.max_bet,
            session_ttl: config.session_ttl,
            bot_token: config.bot_token.clone(),
            activity: VecDeque::with_capacity(MAX_ACTIVITY_ENTRIES),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn save_to_disk(&self) -> Result<(), LedgerError> {
        self.ledger.save_to_disk()?;
        info!("💾 Ledger saved to disk");
        Ok(())
    }

    pub fn log_activity(&mut self, emoji: &str, action: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let entry = format!("[{}] {} {} | {}", timestamp, emoji, action, details);
        info!("{}", entry);
        if self.activity.len() == MAX_ACTIVITY_ENTRIES {
            self.activity.pop_front();
        }
        self.activity.push_back(entry);
    }

    /// Up to `limit` most recent entries, newest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<String> {
        self.activity.iter().rev().take(limit).cloned().collect()
    }
}

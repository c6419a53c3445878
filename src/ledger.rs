//! Ledger Module for the Redmont casino
//!
//! Two flat maps, both mirrored to JSON on disk:
//! - balances: user id -> integer balance
//! - transactions: user id -> ordered, append-only descriptions
//!
//! Files are rewritten wholesale. A missing or unreadable file loads as empty
//! state; it is never fatal.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CasinoError, LedgerError};

// ============================================================================
// LEDGER
// ============================================================================

#[derive(Debug)]
pub struct Ledger {
    /// user id -> balance
    pub balances: HashMap<String, i64>,
    /// user id -> transaction descriptions, oldest first
    pub transactions: HashMap<String, Vec<String>>,
    balances_path: PathBuf,
    transactions_path: PathBuf,
}

impl Ledger {
    /// Empty ledger bound to the given files (nothing is read).
    pub fn new(balances_path: impl Into<PathBuf>, transactions_path: impl Into<PathBuf>) -> Self {
        Self {
            balances: HashMap::new(),
            transactions: HashMap::new(),
            balances_path: balances_path.into(),
            transactions_path: transactions_path.into(),
        }
    }

    /// Ledger populated from disk, defaulting each file to empty on failure.
    pub fn load(balances_path: impl Into<PathBuf>, transactions_path: impl Into<PathBuf>) -> Self {
        let mut ledger = Self::new(balances_path, transactions_path);
        ledger.balances = load_map(&ledger.balances_path);
        ledger.transactions = load_map(&ledger.transactions_path);
        info!(
            "📒 Ledger loaded: {} balances, {} transaction logs",
            ledger.balances.len(),
            ledger.transactions.len()
        );
        ledger
    }

    pub fn get_balance(&self, user: &str) -> i64 {
        self.balances.get(user).copied().unwrap_or(0)
    }

    /// Unconditional add, saturating at the i64 bounds. Callers validate wagers first; no floor is applied here.
    pub fn adjust_balance(&mut self, user: &str, delta: i64) -> i64 {
        let balance = self.balances.entry(user.to_string()).or_insert(0);
        *balance = balance.saturating_add(delta);
        if *balance < 0 {
            warn!("Balance for {} is negative: {}", user, balance);
        }
        *balance
    }

    /// Add `delta` unless the result would overflow; on overflow the balance is left untouched.
    pub fn try_adjust_balance(&mut self, user: &str, delta: i64) -> Option<i64> {
        self.get_balance(user).checked_add(delta)?;
        Some(self.adjust_balance(user, delta))
    }

    /// Append a description and immediately rewrite the transactions file.
    pub fn record_transaction(&mut self, user: &str, description: impl Into<String>) -> Result<(), LedgerError> {
        self.transactions
            .entry(user.to_string())
            .or_default()
            .push(description.into());
        write_json(&self.transactions_path, &self.transactions)
    }

    pub fn transactions_for(&self, user: &str) -> &[String] {
        self.transactions
            .get(user)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Shared wager check: 1 <= bet <= max_bet and bet <= balance.
    pub fn validate_wager(&self, user: &str, bet: i64, max_bet: i64) -> Result<(), CasinoError> {
        if bet <= 0 || bet > max_bet {
            return Err(CasinoError::InvalidBet { max: max_bet });
        }
        let balance = self.get_balance(user);
        if bet > balance {
            return Err(CasinoError::InsufficientFunds { balance, needed: bet });
        }
        Ok(())
    }

    pub fn save_to_disk(&self) -> Result<(), LedgerError> {
        write_json(&self.balances_path, &self.balances)?;
        write_json(&self.transactions_path, &self.transactions)?;
        Ok(())
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            accounts: self.balances.len(),
            circulating: self.balances.values().fold(0i64, |acc, &b| acc.saturating_add(b)),
            transactions: self.transactions.values().map(Vec::len).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accounts: usize,
    pub circulating: i64,
    pub transactions: usize,
}

// ============================================================================
// HELPERS
// ============================================================================

fn load_map<T: DeserializeOwned>(path: &Path) -> HashMap<String, T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("⚠️  Could not read {}: {}. Using default values.", path.display(), e);
            return HashMap::new();
        }
    };

    if raw.trim().is_empty() {
        warn!("⚠️  {} is empty. Using default values.", path.display());
        return HashMap::new();
    }

    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            warn!("⚠️  {} is invalid ({}). Using default values.", path.display(), e);
            HashMap::new()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LedgerError> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn ledger_in(dir: &TempDir) -> Ledger {
        Ledger::new(dir.path().join("balances.json"), dir.path().join("transactions.json"))
    }

    #[test]
    fn test_unknown_user_has_zero_balance() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        assert_eq!(ledger.get_balance("nobody"), 0);
        assert!(ledger.transactions_for("nobody").is_empty());
    }

    #[test]
    fn test_adjust_is_additive() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("alice", 70);
        ledger.adjust_balance("alice", -25);
        assert_eq!(ledger.get_balance("alice"), 45);

        // no floor at this layer
        assert_eq!(ledger.adjust_balance("bob", -10), -10);
    }

    #[test]
    fn test_record_transaction_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.record_transaction("alice", "first").unwrap();
        ledger.record_transaction("alice", "second").unwrap();

        let raw = fs::read_to_string(dir.path().join("transactions.json")).unwrap();
        let on_disk: HashMap<String, Vec<String>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk["alice"], vec!["first", "second"]);
        // balances are only written by save_to_disk
        assert!(!dir.path().join("balances.json").exists());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("111", 500);
        ledger.adjust_balance("222", -3);
        assert_ok!(ledger.record_transaction("111", "Admin increased balance by $500"));
        assert_ok!(ledger.save_to_disk());

        let reloaded = Ledger::load(dir.path().join("balances.json"), dir.path().join("transactions.json"));
        assert_eq!(reloaded.balances, ledger.balances);
        assert_eq!(reloaded.transactions, ledger.transactions);
    }

    #[test]
    fn test_bad_files_load_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("balances.json"), "[1, 2, 3]").unwrap();
        fs::write(dir.path().join("transactions.json"), "   ").unwrap();

        let ledger = Ledger::load(dir.path().join("balances.json"), dir.path().join("transactions.json"));
        assert!(ledger.balances.is_empty());
        assert!(ledger.transactions.is_empty());

        let missing = Ledger::load(dir.path().join("nope.json"), dir.path().join("nope2.json"));
        assert!(missing.balances.is_empty());
    }

    #[test]
    fn test_validate_wager() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("alice", 100);

        assert_ok!(ledger.validate_wager("alice", 100, 10_000));
        assert_err!(ledger.validate_wager("alice", -5, 10_000));
        assert!(matches!(
            ledger.validate_wager("alice", 0, 10_000),
            Err(CasinoError::InvalidBet { max: 10_000 })
        ));
        assert!(matches!(
            ledger.validate_wager("alice", 60, 50),
            Err(CasinoError::InvalidBet { max: 50 })
        ));
        assert!(matches!(
            ledger.validate_wager("alice", 101, 10_000),
            Err(CasinoError::InsufficientFunds { balance: 100, needed: 101 })
        ));
    }

    #[test]
    fn test_overflow_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);

        assert_eq!(ledger.try_adjust_balance("whale", i64::MAX), Some(i64::MAX));
        assert_eq!(ledger.try_adjust_balance("whale", 1), None);
        assert_eq!(ledger.get_balance("whale"), i64::MAX);

        assert_eq!(ledger.adjust_balance("whale", 1), i64::MAX);
        ledger.adjust_balance("minnow", 1);
        assert_eq!(ledger.stats().circulating, i64::MAX);
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("a", 10);
        ledger.adjust_balance("b", 5);
        ledger.record_transaction("a", "x").unwrap();
        assert_eq!(
            ledger.stats(),
            LedgerStats { accounts: 2, circulating: 15, transactions: 1 }
        );
    }
}

// Deposit and withdrawal requests awaiting staff review

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{CasinoError, CasinoResult};
use crate::ledger::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierRequest {
    pub id: String,
    pub kind: RequestKind,
    pub user_id: String,
    pub amount: i64,
    /// Deposit proof (screenshot URL)
    #[serde(default)]
    pub proof_url: Option<String>,
    /// In-game name the withdrawal is paid to
    #[serde(default)]
    pub ign: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl CashierRequest {
    fn new(kind: RequestKind, user_id: &str, amount: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            user_id: user_id.to_string(),
            amount,
            proof_url: None,
            ign: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Cashier {
    /// Keyed by request id
    requests: HashMap<String, CashierRequest>,
}

impl Cashier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_deposit(&mut self, user: &str, amount: i64, proof_url: &str) -> CasinoResult<CashierRequest> {
        if amount <= 0 {
            return Err(CasinoError::InvalidAmount);
        }
        let mut request = CashierRequest::new(RequestKind::Deposit, user, amount);
        request.proof_url = Some(proof_url.to_string());
        info!("💰 Deposit request {} from {} for ${}", request.id, user, amount);
        self.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    pub fn submit_withdrawal(&mut self, ledger: &Ledger, user: &str, amount: i64, ign: &str) -> CasinoResult<CashierRequest> {
        if amount <= 0 {
            return Err(CasinoError::InvalidAmount);
        }
        let balance = ledger.get_balance(user);
        if balance < amount {
            return Err(CasinoError::InsufficientFunds { balance, needed: amount });
        }
        let mut request = CashierRequest::new(RequestKind::Withdrawal, user, amount);
        request.ign = Some(ign.to_string());
        info!("🏦 Withdrawal request {} from {} for ${} (IGN {})", request.id, user, amount, ign);
        self.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    /// Pending requests, oldest first.
    pub fn pending(&self) -> Vec<&CashierRequest> {
        let mut pending: Vec<&CashierRequest> = self
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        pending
    }

    pub fn get(&self, id: &str) -> Option<&CashierRequest> {
        self.requests.get(id)
    }

    /// Accept or reject a pending request. Accepting moves the funds.
    pub fn review(&mut self, ledger: &mut Ledger, id: &str, approve: bool, reviewer: &str) -> CasinoResult<CashierRequest> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| CasinoError::RequestNotFound(id.to_string()))?;

        if request.status != RequestStatus::Pending {
            return Err(CasinoError::AlreadyReviewed(id.to_string()));
        }

        if approve {
            let description = match request.kind {
                RequestKind::Deposit => {
                    ledger
                        .try_adjust_balance(&request.user_id, request.amount)
                        .ok_or(CasinoError::InvalidAmount)?;
                    format!("Deposit accepted: +${}", request.amount)
                }
                RequestKind::Withdrawal => {
                    let balance = ledger.get_balance(&request.user_id);
                    if balance < request.amount {
                        return Err(CasinoError::InsufficientFunds {
                            balance,
                            needed: request.amount,
                        });
                    }
                    ledger.adjust_balance(&request.user_id, -request.amount);
                    format!("Withdrawal approved: -${}", request.amount)
                }
            };
            if let Err(e) = ledger.record_transaction(&request.user_id, description) {
                error!("Failed to persist transaction for {}: {}", request.user_id, e);
            }
            request.status = RequestStatus::Accepted;
        } else {
            request.status = RequestStatus::Rejected;
        }

        request.reviewed_by = Some(reviewer.to_string());
        request.reviewed_at = Some(Utc::now());
        info!("🧾 {:?} {} {:?} by {}", request.kind, request.id, request.status, reviewer);
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger_in(dir: &TempDir) -> Ledger {
        Ledger::new(dir.path().join("b.json"), dir.path().join("t.json"))
    }

    #[test]
    fn test_deposit_accept_credits() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let mut cashier = Cashier::new();

        let req = cashier.submit_deposit("alice", 300, "https://img/proof.png").unwrap();
        assert_eq!(cashier.pending().len(), 1);
        assert_eq!(ledger.get_balance("alice"), 0);

        let reviewed = cashier.review(&mut ledger, &req.id, true, "staff").unwrap();
        assert_eq!(reviewed.status, RequestStatus::Accepted);
        assert_eq!(ledger.get_balance("alice"), 300);
        assert_eq!(ledger.transactions_for("alice"), ["Deposit accepted: +$300"]);
        assert!(cashier.pending().is_empty());
    }

    #[test]
    fn test_reject_leaves_balance() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("bob", 100);
        let mut cashier = Cashier::new();

        let req = cashier.submit_withdrawal(&ledger, "bob", 60, "BobInGame").unwrap();
        let reviewed = cashier.review(&mut ledger, &req.id, false, "staff").unwrap();
        assert_eq!(reviewed.status, RequestStatus::Rejected);
        assert_eq!(ledger.get_balance("bob"), 100);

        assert!(matches!(
            cashier.review(&mut ledger, &req.id, true, "staff"),
            Err(CasinoError::AlreadyReviewed(_))
        ));
    }

    #[test]
    fn test_withdrawal_checks_balance_twice() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("carol", 50);
        let mut cashier = Cashier::new();

        assert!(matches!(
            cashier.submit_withdrawal(&ledger, "carol", 51, "c"),
            Err(CasinoError::InsufficientFunds { .. })
        ));

        let req = cashier.submit_withdrawal(&ledger, "carol", 50, "c").unwrap();
        ledger.adjust_balance("carol", -20);
        assert!(cashier.review(&mut ledger, &req.id, true, "staff").is_err());
        assert_eq!(cashier.get(&req.id).unwrap().status, RequestStatus::Pending);

        ledger.adjust_balance("carol", 20);
        cashier.review(&mut ledger, &req.id, true, "staff").unwrap();
        assert_eq!(ledger.get_balance("carol"), 0);
    }

    #[test]
    fn test_pending_is_oldest_first() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let mut cashier = Cashier::new();

        let ids: Vec<String> = (1..=5)
            .map(|n| cashier.submit_deposit("dana", n * 10, "p").unwrap().id)
            .collect();
        cashier.review(&mut ledger, &ids[2], false, "staff").unwrap();

        let amounts: Vec<i64> = cashier.pending().iter().map(|r| r.amount).collect();
        assert_eq!(amounts.len(), 4);
        assert!(!amounts.contains(&30));
        assert_eq!(cashier.get(&ids[2]).unwrap().status, RequestStatus::Rejected);
    }

    #[test]
    fn test_deposit_overflow_stays_pending() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.adjust_balance("eve", i64::MAX);
        let mut cashier = Cashier::new();

        let req = cashier.submit_deposit("eve", 1, "p").unwrap();
        assert!(matches!(
            cashier.review(&mut ledger, &req.id, true, "staff"),
            Err(CasinoError::InvalidAmount)
        ));
        assert_eq!(cashier.get(&req.id).unwrap().status, RequestStatus::Pending);
        assert_eq!(ledger.get_balance("eve"), i64::MAX);
    }

    #[test]
    fn test_rejects_bad_amounts_and_ids() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let mut cashier = Cashier::new();
        assert!(matches!(
            cashier.submit_deposit("a", 0, "x"),
            Err(CasinoError::InvalidAmount)
        ));
        assert!(matches!(
            cashier.review(&mut ledger, "missing", true, "staff"),
            Err(CasinoError::RequestNotFound(_))
        ));
    }
}

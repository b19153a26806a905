//! Reconciliation audit sweep.
//!
//! Compares each stored fund balance with the balance the ledger implies.
//! Read-only: a gap is reported, never repaired.

use std::sync::Arc;

use tracing::warn;
use tsnt_shared::types::FundId;

use super::error::FinanceError;
use super::reconciliation::expected_balance;
use super::store::FundRepository;
use super::types::{FundAudit, FundLedgerSnapshot};

/// Audits fund balances against completed ledger entries.
pub struct AuditService<R: FundRepository> {
    repo: Arc<R>,
}

impl<R: FundRepository> AuditService<R> {
    /// Create a new audit service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Audit a single fund.
    pub async fn audit_fund(&self, id: FundId) -> Result<FundAudit, FinanceError> {
        let snapshot = self
            .repo
            .ledger_snapshot(id)
            .await?
            .ok_or(FinanceError::FundNotFound(id))?;
        Ok(audit(&snapshot))
    }

    /// Audit every fund, in name order.
    ///
    /// Funds deleted while the sweep runs are skipped.
    pub async fn audit_all(&self) -> Result<Vec<FundAudit>, FinanceError> {
        let funds = self.repo.list_funds().await?;
        let mut audits = Vec::with_capacity(funds.len());
        for fund in &funds {
            if let Some(snapshot) = self.repo.ledger_snapshot(fund.id).await? {
                audits.push(audit(&snapshot));
            }
        }
        Ok(audits)
    }

    /// Fail with `ConsistencyGap` if the fund's balance disagrees with the ledger.
    pub async fn ensure_consistent(&self, id: FundId) -> Result<(), FinanceError> {
        let audit = self.audit_fund(id).await?;
        if audit.consistent {
            Ok(())
        } else {
            Err(FinanceError::ConsistencyGap {
                fund_id: id,
                stored: audit.stored_balance,
                expected: audit.expected_balance,
            })
        }
    }
}

fn audit(snapshot: &FundLedgerSnapshot) -> FundAudit {
    let expected = expected_balance(snapshot.opening_balance, snapshot.totals);
    let consistent = expected == snapshot.balance;
    if !consistent {
        warn!(
            fund_id = %snapshot.fund_id,
            stored = %snapshot.balance,
            expected = %expected,
            "fund balance does not match ledger"
        );
    }
    FundAudit {
        fund_id: snapshot.fund_id,
        stored_balance: snapshot.balance,
        expected_balance: expected,
        consistent,
    }
}

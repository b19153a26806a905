//! In-memory finance store.
//!
//! Holds all state behind one mutex so every repository call, including the
//! balance effect that travels with it, is a single critical section. Used
//! by tests and local tooling; production uses the PostgreSQL store.

use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use tsnt_shared::types::{
    Amount, BankAccountId, FinanceTransactionId, FundId, PageRequest, UserId,
};

use super::error::FinanceError;
use super::reconciliation::BalanceEffect;
use super::store::{BankAccountRepository, FundRepository, TransactionRepository};
use super::types::{
    BankAccount, BankAccountStatus, CompletedTotals, FinanceTransaction, Fund,
    FundLedgerSnapshot, FundSummary,
    RefObject, TopContributor, TransactionFilter, TransactionStatus, TransactionType,
    TransactionView, UserSummary,
};

#[derive(Debug, Default)]
struct State {
    funds: HashMap<FundId, Fund>,
    transactions: HashMap<FinanceTransactionId, FinanceTransaction>,
    bank_accounts: HashMap<BankAccountId, BankAccount>,
    users: HashMap<UserId, UserSummary>,
}

impl State {
    fn fund_mut(&mut self, id: FundId) -> Result<&mut Fund, FinanceError> {
        self.funds.get_mut(&id).ok_or(FinanceError::FundNotFound(id))
    }

    fn apply_effect(&mut self, fund_id: FundId, effect: BalanceEffect) -> Result<Fund, FinanceError> {
        let fund = self.fund_mut(fund_id)?;
        let next = effect
            .apply_to(fund.balance)
            .ok_or(FinanceError::InsufficientBalance {
                fund_id,
                requested: effect.amount().value(),
            })?;
        fund.balance = next;
        fund.updated_at = Utc::now();
        Ok(fund.clone())
    }

    fn view(&self, tx: &FinanceTransaction) -> TransactionView {
        TransactionView {
            transaction: tx.clone(),
            fund: self.funds.get(&tx.fund_id).map(|f| FundSummary {
                id: f.id,
                name: f.name.clone(),
                currency: f.currency.clone(),
            }),
            user: self.users.get(&tx.user_id).cloned(),
        }
    }
}

/// Finance store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryFinanceStore {
    state: Mutex<State>,
}

impl InMemoryFinanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the display data of a portal user.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if the store lock is poisoned.
    pub fn insert_user(&self, user: UserSummary) -> Result<(), FinanceError> {
        self.with_state(|state| {
            state.users.insert(user.id, user);
            Ok(())
        })
    }

    /// Overwrites a stored balance without touching the ledger.
    #[cfg(test)]
    pub(crate) fn set_raw_balance(&self, id: FundId, balance: Decimal) {
        let mut state = self.lock().unwrap();
        state.funds.get_mut(&id).unwrap().balance = balance;
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, FinanceError> {
        self.state
            .lock()
            .map_err(|_| FinanceError::Storage("in-memory store lock poisoned".to_string()))
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut State) -> Result<T, FinanceError>,
    ) -> Result<T, FinanceError> {
        let mut state = self.lock()?;
        f(&mut state)
    }
}

impl FundRepository for InMemoryFinanceStore {
    fn insert_fund(&self, fund: Fund) -> impl Future<Output = Result<Fund, FinanceError>> + Send {
        ready(self.with_state(|state| {
            state.funds.insert(fund.id, fund.clone());
            Ok(fund)
        }))
    }

    fn find_fund(
        &self,
        id: FundId,
    ) -> impl Future<Output = Result<Option<Fund>, FinanceError>> + Send {
        ready(self.with_state(|state| Ok(state.funds.get(&id).cloned())))
    }

    fn list_funds(&self) -> impl Future<Output = Result<Vec<Fund>, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let mut funds: Vec<Fund> = state.funds.values().cloned().collect();
            funds.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            Ok(funds)
        }))
    }

    fn update_fund_metadata(
        &self,
        fund: Fund,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let stored = state.fund_mut(fund.id)?;
            stored.name = fund.name;
            stored.currency = fund.currency;
            stored.account_num = fund.account_num;
            stored.updated_at = fund.updated_at;
            Ok(stored.clone())
        }))
    }

    fn delete_fund(&self, id: FundId) -> impl Future<Output = Result<(), FinanceError>> + Send {
        ready(self.with_state(|state| {
            if !state.funds.contains_key(&id) {
                return Err(FinanceError::FundNotFound(id));
            }
            let count = state
                .transactions
                .values()
                .filter(|tx| tx.fund_id == id)
                .count() as u64;
            if count > 0 {
                return Err(FinanceError::FundHasTransactions { fund_id: id, count });
            }
            state.funds.remove(&id);
            Ok(())
        }))
    }

    fn increment_balance(
        &self,
        id: FundId,
        amount: Amount,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send {
        ready(self.with_state(|state| state.apply_effect(id, BalanceEffect::Increase(amount))))
    }

    fn decrement_balance(
        &self,
        id: FundId,
        amount: Amount,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send {
        ready(self.with_state(|state| state.apply_effect(id, BalanceEffect::Decrease(amount))))
    }

    fn override_balance(
        &self,
        id: FundId,
        new_balance: Decimal,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let fund = state.fund_mut(id)?;
            let delta = new_balance - fund.balance;
            fund.opening_balance += delta;
            fund.balance = new_balance;
            fund.updated_at = Utc::now();
            Ok(fund.clone())
        }))
    }

    fn ledger_snapshot(
        &self,
        id: FundId,
    ) -> impl Future<Output = Result<Option<FundLedgerSnapshot>, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let Some(fund) = state.funds.get(&id) else {
                return Ok(None);
            };
            let mut totals = CompletedTotals::default();
            for tx in state
                .transactions
                .values()
                .filter(|tx| tx.fund_id == id && tx.status.is_completed())
            {
                match tx.kind {
                    TransactionType::Income => totals.income += tx.amount.value(),
                    TransactionType::Expense => totals.expense += tx.amount.value(),
                }
            }
            Ok(Some(FundLedgerSnapshot {
                fund_id: id,
                balance: fund.balance,
                opening_balance: fund.opening_balance,
                totals,
            }))
        }))
    }
}

impl TransactionRepository for InMemoryFinanceStore {
    fn insert_transaction(
        &self,
        tx: FinanceTransaction,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<FinanceTransaction, FinanceError>> + Send {
        ready(self.with_state(|state| {
            if !state.funds.contains_key(&tx.fund_id) {
                return Err(FinanceError::FundNotFound(tx.fund_id));
            }
            if let Some(effect) = effect {
                state.apply_effect(tx.fund_id, effect)?;
            }
            state.transactions.insert(tx.id, tx.clone());
            Ok(tx)
        }))
    }

    fn find_transaction(
        &self,
        id: FinanceTransactionId,
    ) -> impl Future<Output = Result<Option<FinanceTransaction>, FinanceError>> + Send {
        ready(self.with_state(|state| Ok(state.transactions.get(&id).cloned())))
    }

    fn find_transaction_view(
        &self,
        id: FinanceTransactionId,
    ) -> impl Future<Output = Result<Option<TransactionView>, FinanceError>> + Send {
        ready(self.with_state(|state| Ok(state.transactions.get(&id).map(|tx| state.view(tx)))))
    }

    fn update_status(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<FinanceTransaction, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let (fund_id, current) = state
                .transactions
                .get(&id)
                .map(|tx| (tx.fund_id, tx.status))
                .ok_or(FinanceError::TransactionNotFound(id))?;
            if current != expected {
                return Err(FinanceError::ConcurrentModification);
            }
            if let Some(effect) = effect {
                state.apply_effect(fund_id, effect)?;
            }
            let tx = state
                .transactions
                .get_mut(&id)
                .ok_or(FinanceError::TransactionNotFound(id))?;
            tx.status = new;
            tx.updated_at = Utc::now();
            Ok(tx.clone())
        }))
    }

    fn delete_transaction(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<(), FinanceError>> + Send {
        ready(self.with_state(|state| {
            let (fund_id, current) = state
                .transactions
                .get(&id)
                .map(|tx| (tx.fund_id, tx.status))
                .ok_or(FinanceError::TransactionNotFound(id))?;
            if current != expected {
                return Err(FinanceError::ConcurrentModification);
            }
            if let Some(effect) = effect {
                state.apply_effect(fund_id, effect)?;
            }
            state.transactions.remove(&id);
            Ok(())
        }))
    }

    fn query_transactions(
        &self,
        filter: &TransactionFilter,
        window: Option<PageRequest>,
    ) -> impl Future<Output = Result<(Vec<TransactionView>, u64), FinanceError>> + Send {
        ready(self.with_state(|state| {
            let mut matching: Vec<&FinanceTransaction> = state
                .transactions
                .values()
                .filter(|tx| filter.accepts(tx))
                .collect();
            matching.sort_by(|a, b| filter.compare(a, b).then_with(|| b.id.cmp(&a.id)));
            let total = matching.len() as u64;

            let (skip, take) = match window {
                Some(page) => (
                    usize::try_from(page.offset()).unwrap_or(usize::MAX),
                    page.limit as usize,
                ),
                None => (0, matching.len()),
            };
            let views = matching
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|tx| state.view(tx))
                .collect();
            Ok((views, total))
        }))
    }

    fn top_contributors(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<TopContributor>, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let mut totals: HashMap<UserId, (Decimal, u64)> = HashMap::new();
            for tx in state.transactions.values().filter(|tx| {
                tx.kind == TransactionType::Income && tx.status == TransactionStatus::Completed
            }) {
                let entry = totals.entry(tx.user_id).or_default();
                entry.0 += tx.amount.value();
                entry.1 += 1;
            }

            let mut board: Vec<TopContributor> = totals
                .into_iter()
                .filter_map(|(user_id, (total_amount, count))| {
                    let user = state.users.get(&user_id)?;
                    Some(TopContributor {
                        user_id,
                        total_amount,
                        count,
                        username: user.username.clone(),
                        name: user.display_name().to_string(),
                        avatar: user.avatar.clone(),
                    })
                })
                .collect();
            board.sort_by(|a, b| {
                b.total_amount
                    .cmp(&a.total_amount)
                    .then_with(|| a.user_id.cmp(&b.user_id))
            });
            board.truncate(limit as usize);
            Ok(board)
        }))
    }

    fn find_by_reference(
        &self,
        reference: RefObject,
    ) -> impl Future<Output = Result<Vec<FinanceTransaction>, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let mut found: Vec<FinanceTransaction> = state
                .transactions
                .values()
                .filter(|tx| tx.ref_obj == Some(reference))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
            Ok(found)
        }))
    }
}

impl BankAccountRepository for InMemoryFinanceStore {
    fn insert_bank_account(
        &self,
        account: BankAccount,
    ) -> impl Future<Output = Result<BankAccount, FinanceError>> + Send {
        ready(self.with_state(|state| {
            state.bank_accounts.insert(account.id, account.clone());
            Ok(account)
        }))
    }

    fn find_bank_account(
        &self,
        id: BankAccountId,
    ) -> impl Future<Output = Result<Option<BankAccount>, FinanceError>> + Send {
        ready(self.with_state(|state| Ok(state.bank_accounts.get(&id).cloned())))
    }

    fn list_bank_accounts(
        &self,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<BankAccount>, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let mut accounts: Vec<BankAccount> = state
                .bank_accounts
                .values()
                .filter(|a| !active_only || a.status == BankAccountStatus::Active)
                .cloned()
                .collect();
            accounts.sort_by(|a, b| {
                a.bank_name
                    .cmp(&b.bank_name)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(accounts)
        }))
    }

    fn update_bank_account(
        &self,
        account: BankAccount,
    ) -> impl Future<Output = Result<BankAccount, FinanceError>> + Send {
        ready(self.with_state(|state| {
            let stored = state
                .bank_accounts
                .get_mut(&account.id)
                .ok_or(FinanceError::BankAccountNotFound(account.id))?;
            *stored = account.clone();
            Ok(account)
        }))
    }

    fn delete_bank_account(
        &self,
        id: BankAccountId,
    ) -> impl Future<Output = Result<(), FinanceError>> + Send {
        ready(self.with_state(|state| {
            state
                .bank_accounts
                .remove(&id)
                .map(|_| ())
                .ok_or(FinanceError::BankAccountNotFound(id))
        }))
    }
}

//! Storage contracts for funds, ledger entries, and bank accounts.
//!
//! These traits are implemented by the db crate (PostgreSQL) and by
//! [`crate::finance::memory::InMemoryFinanceStore`]. Every method that takes a
//! [`BalanceEffect`] must commit the effect and the record write together or
//! not at all.

use std::future::Future;

use rust_decimal::Decimal;
use tsnt_shared::types::{Amount, BankAccountId, FinanceTransactionId, FundId, PageRequest};

use super::error::FinanceError;
use super::reconciliation::BalanceEffect;
use super::types::{
    BankAccount, FinanceTransaction, Fund, FundLedgerSnapshot, RefObject, TopContributor,
    TransactionFilter, TransactionStatus, TransactionView,
};

/// Repository trait for fund persistence and the balance primitives.
pub trait FundRepository: Send + Sync {
    /// Persist a new fund.
    fn insert_fund(&self, fund: Fund) -> impl Future<Output = Result<Fund, FinanceError>> + Send;

    /// Find fund by ID.
    fn find_fund(
        &self,
        id: FundId,
    ) -> impl Future<Output = Result<Option<Fund>, FinanceError>> + Send;

    /// List all funds sorted by name.
    fn list_funds(&self) -> impl Future<Output = Result<Vec<Fund>, FinanceError>> + Send;

    /// Overwrite name, currency, account number and `updated_at`.
    ///
    /// Never touches `balance` or `opening_balance`.
    fn update_fund_metadata(
        &self,
        fund: Fund,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send;

    /// Delete a fund that no ledger entry references.
    ///
    /// Fails with `FundHasTransactions` otherwise.
    fn delete_fund(&self, id: FundId) -> impl Future<Output = Result<(), FinanceError>> + Send;

    /// Atomically add `amount` to the balance.
    fn increment_balance(
        &self,
        id: FundId,
        amount: Amount,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send;

    /// Atomically subtract `amount` if the balance covers it.
    ///
    /// Fails with `InsufficientBalance` and leaves the balance unchanged otherwise.
    fn decrement_balance(
        &self,
        id: FundId,
        amount: Amount,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send;

    /// Set the balance to `new_balance`, shifting `opening_balance` by the same delta.
    fn override_balance(
        &self,
        id: FundId,
        new_balance: Decimal,
    ) -> impl Future<Output = Result<Fund, FinanceError>> + Send;

    /// Read a fund's balances and its completed income and expense sums
    /// as one consistent view.
    ///
    /// No ledger write may land between the balance read and the sums.
    fn ledger_snapshot(
        &self,
        id: FundId,
    ) -> impl Future<Output = Result<Option<FundLedgerSnapshot>, FinanceError>> + Send;
}

/// Repository trait for ledger entries.
pub trait TransactionRepository: Send + Sync {
    /// Persist a new entry and apply `effect` to its fund in one unit of work.
    ///
    /// Fails with `FundNotFound` if the fund does not exist.
    fn insert_transaction(
        &self,
        tx: FinanceTransaction,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<FinanceTransaction, FinanceError>> + Send;

    /// Find entry by ID.
    fn find_transaction(
        &self,
        id: FinanceTransactionId,
    ) -> impl Future<Output = Result<Option<FinanceTransaction>, FinanceError>> + Send;

    /// Find entry by ID with fund and user populated.
    fn find_transaction_view(
        &self,
        id: FinanceTransactionId,
    ) -> impl Future<Output = Result<Option<TransactionView>, FinanceError>> + Send;

    /// Move an entry from `expected` to `new` status, applying `effect` in the
    /// same unit of work.
    ///
    /// Fails with `ConcurrentModification` if the stored status is no longer `expected`.
    fn update_status(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<FinanceTransaction, FinanceError>> + Send;

    /// Delete an entry still in `expected` status, applying `effect` in the
    /// same unit of work.
    fn delete_transaction(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> impl Future<Output = Result<(), FinanceError>> + Send;

    /// Query populated entries matching every non-search filter of `filter`,
    /// sorted as requested.
    ///
    /// With `window` the result is one page plus the total count; without it
    /// the full matching set is returned.
    fn query_transactions(
        &self,
        filter: &TransactionFilter,
        window: Option<PageRequest>,
    ) -> impl Future<Output = Result<(Vec<TransactionView>, u64), FinanceError>> + Send;

    /// Completed income grouped by user, largest total first.
    fn top_contributors(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<TopContributor>, FinanceError>> + Send;

    /// Entries created for a business object, newest first.
    fn find_by_reference(
        &self,
        reference: RefObject,
    ) -> impl Future<Output = Result<Vec<FinanceTransaction>, FinanceError>> + Send;
}

/// Repository trait for donation bank accounts.
pub trait BankAccountRepository: Send + Sync {
    /// Persist a new bank account.
    fn insert_bank_account(
        &self,
        account: BankAccount,
    ) -> impl Future<Output = Result<BankAccount, FinanceError>> + Send;

    /// Find bank account by ID.
    fn find_bank_account(
        &self,
        id: BankAccountId,
    ) -> impl Future<Output = Result<Option<BankAccount>, FinanceError>> + Send;

    /// List accounts sorted by bank name, then newest first.
    fn list_bank_accounts(
        &self,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<BankAccount>, FinanceError>> + Send;

    /// Overwrite every mutable field.
    fn update_bank_account(
        &self,
        account: BankAccount,
    ) -> impl Future<Output = Result<BankAccount, FinanceError>> + Send;

    /// Delete bank account by ID.
    fn delete_bank_account(
        &self,
        id: BankAccountId,
    ) -> impl Future<Output = Result<(), FinanceError>> + Send;
}

/// A backend that stores everything the finance services need.
pub trait FinanceStore: FundRepository + TransactionRepository + BankAccountRepository + 'static {}

impl<T> FinanceStore for T where T: FundRepository + TransactionRepository + BankAccountRepository + 'static {}

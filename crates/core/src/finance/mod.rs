//! Financial ledger for the fund portal.
//!
//! This module implements funds, ledger entries, and the reconciliation
//! protocol that keeps each fund balance equal to its opening balance plus
//! completed income minus completed expense:
//! - Domain types, inputs and read views
//! - Error types for finance operations
//! - Pure reconciliation rules (balance effects)
//! - Storage contracts and an in-memory store
//! - Fund, ledger, audit and bank account services

pub mod audit;
pub mod bank_account_service;
pub mod error;
pub mod fund_service;
pub mod ledger_service;
pub mod memory;
pub mod reconciliation;
pub mod store;
pub mod types;

#[cfg(test)]
mod reconciliation_props;

pub use audit::AuditService;
pub use bank_account_service::BankAccountService;
pub use error::FinanceError;
pub use fund_service::FundService;
pub use ledger_service::{DEFAULT_TOP_CONTRIBUTORS, LedgerService};
pub use memory::InMemoryFinanceStore;
pub use reconciliation::BalanceEffect;
pub use store::{BankAccountRepository, FinanceStore, FundRepository, TransactionRepository};
pub use types::{
    BankAccount, BankAccountStatus, CompletedTotals, CreateBankAccountInput, CreateFundInput,
    CreateTransactionInput, FinanceTransaction, Fund, FundAudit, FundLedgerSnapshot, FundSummary, Invoice,
    PublicContribution, RefObject, SortField, SortOrder, TopContributor, TransactionFilter,
    TransactionStatus, TransactionType, TransactionView, UpdateBankAccountInput, UpdateFundInput,
    UserSummary,
};

//! Repository implementations for data access.
//!
//! [`PgFinanceStore`] implements the finance storage traits on top of
//! `SeaORM`, hiding the database details from the services.

mod bank_account;
mod convert;
mod finance_store;
mod finance_transaction;
mod fund;
pub mod user;

pub use finance_store::PgFinanceStore;
pub use user::UserRepository;

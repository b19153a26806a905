//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod finance_transactions;
pub mod funds;
pub mod sea_orm_active_enums;
pub mod users;

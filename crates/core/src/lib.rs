//! Core business logic for the TSNT fund portal.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached through the repository traits in [`finance::store`].
//!
//! # Modules
//!
//! - `finance` - Funds, transaction ledger, balance reconciliation, audit and bank accounts

pub mod finance;

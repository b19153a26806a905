//! Shared types, errors, and configuration for the TSNT fund portal.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination envelope for list endpoints
//! - Access errors for the identity boundary
//! - Configuration management
//! - JWT claims and token validation for the identity boundary

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::{AppConfig, FinanceConfig};
pub use error::AccessError;
pub use jwt::{JwtConfig, JwtError, JwtService};

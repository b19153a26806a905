//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for funds, the transaction ledger, and bank accounts
//! - Bearer token authentication with role checks
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tsnt_core::finance::{
    AuditService, BankAccountService, FinanceStore, FundService, LedgerService,
};
use tsnt_shared::{FinanceConfig, JwtService};

pub use error::ApiError;

/// Application state shared across handlers.
pub struct AppState<S: FinanceStore> {
    /// Fund service.
    pub funds: Arc<FundService<S>>,
    /// Transaction ledger.
    pub ledger: Arc<LedgerService<S>>,
    /// Reconciliation audit.
    pub audit: Arc<AuditService<S>>,
    /// Donation bank accounts.
    pub bank_accounts: Arc<BankAccountService<S>>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Finance settings (page sizes, defaults).
    pub finance: Arc<FinanceConfig>,
}

impl<S: FinanceStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            funds: Arc::clone(&self.funds),
            ledger: Arc::clone(&self.ledger),
            audit: Arc::clone(&self.audit),
            bank_accounts: Arc::clone(&self.bank_accounts),
            jwt_service: Arc::clone(&self.jwt_service),
            finance: Arc::clone(&self.finance),
        }
    }
}

impl<S: FinanceStore> AppState<S> {
    /// Wires every service over one store.
    #[must_use]
    pub fn new(store: Arc<S>, jwt_service: JwtService, finance: FinanceConfig) -> Self {
        let funds = FundService::new(Arc::clone(&store))
            .with_default_currency(finance.default_currency.clone());
        let ledger = LedgerService::new(Arc::clone(&store))
            .with_top_contributors_limit(finance.top_contributors_limit);
        Self {
            funds: Arc::new(funds),
            ledger: Arc::new(ledger),
            audit: Arc::new(AuditService::new(Arc::clone(&store))),
            bank_accounts: Arc::new(BankAccountService::new(store)),
            jwt_service: Arc::new(jwt_service),
            finance: Arc::new(finance),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: FinanceStore>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

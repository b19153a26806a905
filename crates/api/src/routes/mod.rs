//! API route definitions.

use axum::{Router, middleware};
use tsnt_core::finance::FinanceStore;

use crate::{AppState, middleware::auth_middleware};

pub mod bank_accounts;
pub mod contributions;
pub mod funds;
pub mod health;
pub mod transactions;

/// Creates the API router; everything except the public routes sits behind
/// the auth middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state<S: FinanceStore>(state: AppState<S>) -> Router<AppState<S>> {
    let protected_routes = Router::new()
        .merge(funds::routes())
        .merge(transactions::routes())
        .merge(bank_accounts::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .merge(health::routes())
        .merge(contributions::routes())
        .merge(bank_accounts::public_routes())
        .merge(protected_routes)
}

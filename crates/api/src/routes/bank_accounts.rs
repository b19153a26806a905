//! Donation bank account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tsnt_core::finance::{
    BankAccount, CreateBankAccountInput, FinanceStore, UpdateBankAccountInput,
};
use tsnt_shared::types::BankAccountId;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the staff bank account routes (requires auth middleware to be applied externally).
pub fn routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/finance/bank-accounts",
            get(list_bank_accounts::<S>).post(create_bank_account::<S>),
        )
        .route(
            "/finance/bank-accounts/{id}",
            get(get_bank_account::<S>)
                .patch(update_bank_account::<S>)
                .delete(delete_bank_account::<S>),
        )
}

/// Creates the anonymous listing of active accounts.
pub fn public_routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new().route(
        "/finance/bank-accounts/public",
        get(list_public_bank_accounts::<S>),
    )
}

/// Query parameters for the staff listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListBankAccountsQuery {
    /// Only return active accounts.
    #[serde(default, alias = "activeOnly")]
    pub active_only: bool,
}

async fn create_bank_account<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Json(input): Json<CreateBankAccountInput>,
) -> Result<(StatusCode, Json<BankAccount>), ApiError> {
    auth.require_admin()?;
    let account = state.bank_accounts.create(input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn list_bank_accounts<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Query(query): Query<ListBankAccountsQuery>,
) -> Result<Json<Vec<BankAccount>>, ApiError> {
    auth.require_staff()?;
    Ok(Json(state.bank_accounts.list(query.active_only).await?))
}

async fn list_public_bank_accounts<S: FinanceStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<BankAccount>>, ApiError> {
    Ok(Json(state.bank_accounts.list(true).await?))
}

async fn get_bank_account<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<BankAccountId>,
) -> Result<Json<BankAccount>, ApiError> {
    auth.require_staff()?;
    Ok(Json(state.bank_accounts.get(id).await?))
}

async fn update_bank_account<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<BankAccountId>,
    Json(input): Json<UpdateBankAccountInput>,
) -> Result<Json<BankAccount>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.bank_accounts.update(id, input).await?))
}

async fn delete_bank_account<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<BankAccountId>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    state.bank_accounts.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Fund routes and the reconciliation audit.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tsnt_core::finance::{CreateFundInput, FinanceStore, Fund, FundAudit, UpdateFundInput};
use tsnt_shared::types::FundId;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the fund routes (requires auth middleware to be applied externally).
pub fn routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/finance/funds", get(list_funds::<S>).post(create_fund::<S>))
        .route(
            "/finance/funds/{id}",
            get(get_fund::<S>)
                .patch(update_fund::<S>)
                .delete(delete_fund::<S>),
        )
        .route("/finance/funds/{id}/balance", put(override_balance::<S>))
        .route("/finance/funds/{id}/audit", get(audit_fund::<S>))
        .route("/finance/audit", get(audit_all::<S>))
}

/// Request body for the administrative balance override.
#[derive(Debug, Deserialize)]
pub struct OverrideBalanceRequest {
    /// New balance, at least zero, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

async fn create_fund<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Json(input): Json<CreateFundInput>,
) -> Result<(StatusCode, Json<Fund>), ApiError> {
    auth.require_admin()?;
    let fund = state.funds.create(input).await?;
    Ok((StatusCode::CREATED, Json(fund)))
}

async fn list_funds<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
) -> Result<Json<Vec<Fund>>, ApiError> {
    auth.require_staff()?;
    Ok(Json(state.funds.list().await?))
}

async fn get_fund<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FundId>,
) -> Result<Json<Fund>, ApiError> {
    auth.require_staff()?;
    Ok(Json(state.funds.get(id).await?))
}

async fn update_fund<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FundId>,
    Json(input): Json<UpdateFundInput>,
) -> Result<Json<Fund>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.funds.update(id, input).await?))
}

async fn delete_fund<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FundId>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    state.funds.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn override_balance<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FundId>,
    Json(body): Json<OverrideBalanceRequest>,
) -> Result<Json<Fund>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.funds.override_balance(id, body.balance).await?))
}

async fn audit_fund<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FundId>,
) -> Result<Json<FundAudit>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.audit.audit_fund(id).await?))
}

async fn audit_all<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
) -> Result<Json<Vec<FundAudit>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.audit.audit_all().await?))
}

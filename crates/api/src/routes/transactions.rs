//! Transaction ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tsnt_core::finance::{
    CreateTransactionInput, FinanceError, FinanceStore, FinanceTransaction, Invoice, RefObject,
    SortField, SortOrder, TransactionFilter, TransactionStatus, TransactionType, TransactionView,
};
use tsnt_shared::types::{FinanceTransactionId, FundId, PageRequest, PageResponse};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/finance/transactions",
            get(list_transactions::<S>).post(create_transaction::<S>),
        )
        .route(
            "/finance/transactions/{id}",
            get(get_transaction::<S>).delete(delete_transaction::<S>),
        )
        .route(
            "/finance/transactions/by-reference/{model}/{ref_id}",
            get(transactions_by_reference::<S>),
        )
        .route(
            "/finance/transactions/{id}/status",
            patch(update_status::<S>),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for recording a transaction. The acting user is the caller.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Target fund.
    #[serde(alias = "fundId")]
    pub fund_id: FundId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Positive amount with at most two decimals, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Description.
    #[serde(rename = "desc", alias = "description")]
    pub description: String,
    /// Initial status, pending when omitted.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// Optional invoice.
    #[serde(default)]
    pub invoice: Option<Invoice>,
    /// Optional business reference.
    #[serde(default, alias = "refObj")]
    pub ref_obj: Option<RefObject>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status.
    pub status: TransactionStatus,
}

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Restrict to one fund.
    #[serde(alias = "fundId")]
    pub fund_id: Option<FundId>,
    /// Restrict to income or expense.
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Restrict to one status.
    pub status: Option<TransactionStatus>,
    /// First day included.
    #[serde(alias = "startDate")]
    pub start_date: Option<NaiveDate>,
    /// Last day included.
    #[serde(alias = "endDate")]
    pub end_date: Option<NaiveDate>,
    /// Free-text search over user fields and the description.
    pub search: Option<String>,
    /// Sort column.
    #[serde(alias = "sortBy")]
    pub sort_by: Option<SortField>,
    /// Sort direction.
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<SortOrder>,
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl ListTransactionsQuery {
    fn into_filter(self, default_limit: u32, max_limit: u32) -> TransactionFilter {
        TransactionFilter {
            fund_id: self.fund_id,
            kind: self.kind,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            search: self.search,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            page: PageRequest::from_query(self.page, self.limit, default_limit, max_limit),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_transaction<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<FinanceTransaction>), ApiError> {
    auth.require_staff()?;
    let tx = state
        .ledger
        .create(CreateTransactionInput {
            fund_id: body.fund_id,
            user_id: auth.user_id(),
            kind: body.kind,
            amount: body.amount,
            description: body.description,
            status: body.status,
            invoice: body.invoice,
            ref_obj: body.ref_obj,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn list_transactions<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ApiError> {
    auth.require_staff()?;
    let filter = query.into_filter(state.finance.default_page_size, state.finance.max_page_size);
    Ok(Json(state.ledger.list(&filter).await?))
}

async fn get_transaction<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FinanceTransactionId>,
) -> Result<Json<TransactionView>, ApiError> {
    auth.require_staff()?;
    Ok(Json(state.ledger.get(id).await?))
}

/// Entries recorded for a business object, e.g. one scholarship application.
async fn transactions_by_reference<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path((model, ref_id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<FinanceTransaction>>, ApiError> {
    auth.require_staff()?;
    let reference = RefObject::from_parts(&model, ref_id)
        .ok_or_else(|| FinanceError::validation(format!("Unknown reference model: {model}")))?;
    Ok(Json(state.ledger.by_reference(reference).await?))
}

async fn update_status<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FinanceTransactionId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<FinanceTransaction>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.ledger.update_status(id, body.status).await?))
}

async fn delete_transaction<S: FinanceStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<FinanceTransactionId>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    state.ledger.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

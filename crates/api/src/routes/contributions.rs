//! Public donation feed and leaderboard.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tsnt_core::finance::{FinanceStore, PublicContribution, TopContributor};
use tsnt_shared::types::{PageRequest, PageResponse};

use crate::{AppState, error::ApiError};

/// Creates the public contribution routes.
pub fn routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/finance/contributions", get(list_contributions::<S>))
        .route("/finance/contributions/top", get(top_contributors::<S>))
}

/// Page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Leaderboard query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    /// Number of contributors to return.
    pub limit: Option<u32>,
}

async fn list_contributions<S: FinanceStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PublicContribution>>, ApiError> {
    let page = PageRequest::from_query(
        query.page,
        query.limit,
        state.finance.default_page_size,
        state.finance.max_page_size,
    );
    Ok(Json(state.ledger.public_contributions(page).await?))
}

async fn top_contributors<S: FinanceStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<TopContributor>>, ApiError> {
    let limit = query.limit.map(|l| l.min(state.finance.max_page_size));
    Ok(Json(state.ledger.top_contributors(limit).await?))
}

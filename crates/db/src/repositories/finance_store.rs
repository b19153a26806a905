//! PostgreSQL finance store.
//!
//! Balance changes are single conditional `UPDATE` statements, so two
//! concurrent decrements can never both pass the `balance >= amount` guard.
//! Every ledger write that carries a [`BalanceEffect`] runs in one database
//! transaction together with that effect.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use tsnt_core::finance::{BalanceEffect, FinanceError, TransactionView};
use tsnt_shared::types::{Amount, FundId};

use super::convert::{fund_summary, storage, transaction_from_model, user_summary};
use crate::entities::{finance_transactions, funds, users};

/// Finance store backed by PostgreSQL through `SeaORM`.
#[derive(Debug, Clone)]
pub struct PgFinanceStore {
    pub(super) db: DatabaseConnection,
}

impl PgFinanceStore {
    /// Creates a new finance store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Adds `amount` to a fund's balance.
pub(super) async fn increment<C: ConnectionTrait>(
    conn: &C,
    id: FundId,
    amount: Amount,
) -> Result<funds::Model, FinanceError> {
    funds::Entity::update_many()
        .col_expr(
            funds::Column::Balance,
            Expr::col(funds::Column::Balance).add(amount.value()),
        )
        .col_expr(funds::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(funds::Column::Id.eq(id.into_inner()))
        .exec_with_returning(conn)
        .await
        .map_err(storage)?
        .into_iter()
        .next()
        .ok_or(FinanceError::FundNotFound(id))
}

/// Subtracts `amount` from a fund's balance if the balance covers it.
pub(super) async fn decrement<C: ConnectionTrait>(
    conn: &C,
    id: FundId,
    amount: Amount,
) -> Result<funds::Model, FinanceError> {
    let updated = funds::Entity::update_many()
        .col_expr(
            funds::Column::Balance,
            Expr::col(funds::Column::Balance).sub(amount.value()),
        )
        .col_expr(funds::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(funds::Column::Id.eq(id.into_inner()))
        .filter(funds::Column::Balance.gte(amount.value()))
        .exec_with_returning(conn)
        .await
        .map_err(storage)?;

    if let Some(fund) = updated.into_iter().next() {
        return Ok(fund);
    }

    // Nothing matched: either the fund is gone or the guard refused.
    let exists = funds::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await
        .map_err(storage)?
        .is_some();
    if exists {
        Err(FinanceError::InsufficientBalance {
            fund_id: id,
            requested: amount.value(),
        })
    } else {
        Err(FinanceError::FundNotFound(id))
    }
}

pub(super) async fn apply_effect<C: ConnectionTrait>(
    conn: &C,
    id: FundId,
    effect: BalanceEffect,
) -> Result<funds::Model, FinanceError> {
    match effect {
        BalanceEffect::Increase(amount) => increment(conn, id, amount).await,
        BalanceEffect::Decrease(amount) => decrement(conn, id, amount).await,
    }
}

/// Populates fund and user summaries for a batch of rows, keeping row order.
pub(super) async fn populate<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<finance_transactions::Model>,
) -> Result<Vec<TransactionView>, FinanceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let fund_ids: HashSet<_> = rows.iter().map(|row| row.fund_id).collect();
    let user_ids: HashSet<_> = rows.iter().map(|row| row.user_id).collect();

    let funds: HashMap<_, _> = funds::Entity::find()
        .filter(funds::Column::Id.is_in(fund_ids))
        .all(conn)
        .await
        .map_err(storage)?
        .into_iter()
        .map(|fund| (fund.id, fund))
        .collect();
    let users: HashMap<_, _> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await
        .map_err(storage)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    rows.into_iter()
        .map(|row| {
            let fund = funds.get(&row.fund_id).map(fund_summary);
            let user = users.get(&row.user_id).map(user_summary);
            Ok(TransactionView {
                transaction: transaction_from_model(row)?,
                fund,
                user,
            })
        })
        .collect()
}

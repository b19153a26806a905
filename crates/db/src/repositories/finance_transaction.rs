//! Ledger persistence for [`PgFinanceStore`].

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Order;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, Statement, TransactionTrait,
};
use tsnt_core::finance::{
    BalanceEffect, FinanceError, FinanceTransaction, RefObject, SortField,
    SortOrder, TopContributor, TransactionFilter, TransactionRepository, TransactionStatus,
    TransactionView,
};
use tsnt_shared::types::{FinanceTransactionId, FundId, PageRequest, UserId};
use uuid::Uuid;

use super::convert::{storage, transaction_from_model, transaction_to_active};
use super::finance_store::{PgFinanceStore, apply_effect, populate};
use crate::entities::finance_transactions::{self, Column};
use crate::entities::funds;
use crate::entities::sea_orm_active_enums::{FinanceTransactionStatus, FinanceTransactionType};

const TOP_CONTRIBUTORS_SQL: &str = r"
SELECT t.user_id,
       SUM(t.amount) AS total_amount,
       COUNT(*) AS count,
       u.username,
       u.full_name,
       u.avatar
FROM finance_transactions t
JOIN users u ON u.id = t.user_id
WHERE t.type = 'income' AND t.status = 'completed'
GROUP BY t.user_id, u.username, u.full_name, u.avatar
ORDER BY total_amount DESC, t.user_id ASC
LIMIT $1
";

#[derive(Debug, FromQueryResult)]
struct ContributorRow {
    user_id: Uuid,
    total_amount: Decimal,
    count: i64,
    username: String,
    full_name: Option<String>,
    avatar: Option<String>,
}

/// Applies every non-search filter.
fn filtered(filter: &TransactionFilter) -> Select<finance_transactions::Entity> {
    let mut query = finance_transactions::Entity::find();
    if let Some(fund_id) = filter.fund_id {
        query = query.filter(Column::FundId.eq(fund_id.into_inner()));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(Column::Kind.eq(FinanceTransactionType::from(kind)));
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(FinanceTransactionStatus::from(status)));
    }
    if let Some(from) = filter.created_from() {
        query = query.filter(Column::CreatedAt.gte(from));
    }
    if let Some(before) = filter.created_before() {
        query = query.filter(Column::CreatedAt.lt(before));
    }
    query
}

fn sorted(
    query: Select<finance_transactions::Entity>,
    filter: &TransactionFilter,
) -> Select<finance_transactions::Entity> {
    let column = match filter.sort_by {
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
        SortField::Amount => Column::Amount,
        SortField::Status => Column::Status,
        SortField::Kind => Column::Kind,
    };
    let order = match filter.sort_order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };
    query.order_by(column, order).order_by_desc(Column::Id)
}

impl PgFinanceStore {
    /// Resolves why a guarded write matched no row.
    async fn missing_or_moved<C: sea_orm::ConnectionTrait>(
        conn: &C,
        id: FinanceTransactionId,
    ) -> FinanceError {
        match finance_transactions::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await
        {
            Ok(Some(_)) => FinanceError::ConcurrentModification,
            Ok(None) => FinanceError::TransactionNotFound(id),
            Err(err) => storage(err),
        }
    }
}

impl TransactionRepository for PgFinanceStore {
    async fn insert_transaction(
        &self,
        tx: FinanceTransaction,
        effect: Option<BalanceEffect>,
    ) -> Result<FinanceTransaction, FinanceError> {
        let txn = self.db.begin().await.map_err(storage)?;

        match effect {
            Some(effect) => {
                apply_effect(&txn, tx.fund_id, effect).await?;
            }
            None => {
                funds::Entity::find_by_id(tx.fund_id.into_inner())
                    .one(&txn)
                    .await
                    .map_err(storage)?
                    .ok_or(FinanceError::FundNotFound(tx.fund_id))?;
            }
        }

        let model = transaction_to_active(&tx)
            .insert(&txn)
            .await
            .map_err(storage)?;
        txn.commit().await.map_err(storage)?;
        transaction_from_model(model)
    }

    async fn find_transaction(
        &self,
        id: FinanceTransactionId,
    ) -> Result<Option<FinanceTransaction>, FinanceError> {
        finance_transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(transaction_from_model)
            .transpose()
    }

    async fn find_transaction_view(
        &self,
        id: FinanceTransactionId,
    ) -> Result<Option<TransactionView>, FinanceError> {
        let rows: Vec<_> = finance_transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .collect();
        Ok(populate(&self.db, rows).await?.into_iter().next())
    }

    async fn update_status(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> Result<FinanceTransaction, FinanceError> {
        let txn = self.db.begin().await.map_err(storage)?;

        // Compare-and-swap on the status column.
        let updated = finance_transactions::Entity::update_many()
            .set(finance_transactions::ActiveModel {
                status: Set(new.into()),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(Column::Id.eq(id.into_inner()))
            .filter(Column::Status.eq(FinanceTransactionStatus::from(expected)))
            .exec_with_returning(&txn)
            .await
            .map_err(storage)?;

        let Some(model) = updated.into_iter().next() else {
            return Err(Self::missing_or_moved(&txn, id).await);
        };

        if let Some(effect) = effect {
            apply_effect(&txn, FundId::from_uuid(model.fund_id), effect).await?;
        }

        txn.commit().await.map_err(storage)?;
        transaction_from_model(model)
    }

    async fn delete_transaction(
        &self,
        id: FinanceTransactionId,
        expected: TransactionStatus,
        effect: Option<BalanceEffect>,
    ) -> Result<(), FinanceError> {
        let txn = self.db.begin().await.map_err(storage)?;

        // Lock the row while it still has the status the caller read.
        let Some(model) = finance_transactions::Entity::find_by_id(id.into_inner())
            .filter(Column::Status.eq(FinanceTransactionStatus::from(expected)))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(storage)?
        else {
            return Err(Self::missing_or_moved(&txn, id).await);
        };

        finance_transactions::Entity::delete_by_id(model.id)
            .exec(&txn)
            .await
            .map_err(storage)?;

        if let Some(effect) = effect {
            apply_effect(&txn, FundId::from_uuid(model.fund_id), effect).await?;
        }

        txn.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        window: Option<PageRequest>,
    ) -> Result<(Vec<TransactionView>, u64), FinanceError> {
        let query = sorted(filtered(filter), filter);

        let (rows, total) = match window {
            Some(page) => {
                let total = query.clone().count(&self.db).await.map_err(storage)?;
                let rows = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
                    .await
                    .map_err(storage)?;
                (rows, total)
            }
            None => {
                let rows = query.all(&self.db).await.map_err(storage)?;
                let total = rows.len() as u64;
                (rows, total)
            }
        };

        Ok((populate(&self.db, rows).await?, total))
    }

    async fn top_contributors(&self, limit: u32) -> Result<Vec<TopContributor>, FinanceError> {
        let rows = ContributorRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            TOP_CONTRIBUTORS_SQL,
            [i64::from(limit).into()],
        ))
        .all(&self.db)
        .await
        .map_err(storage)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let name = row
                    .full_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| row.username.clone());
                TopContributor {
                    user_id: UserId::from_uuid(row.user_id),
                    total_amount: row.total_amount,
                    count: u64::try_from(row.count).unwrap_or_default(),
                    username: row.username,
                    name,
                    avatar: row.avatar,
                }
            })
            .collect())
    }

    async fn find_by_reference(
        &self,
        reference: RefObject,
    ) -> Result<Vec<FinanceTransaction>, FinanceError> {
        finance_transactions::Entity::find()
            .filter(Column::RefModel.eq(reference.model()))
            .filter(Column::RefId.eq(reference.id()))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(transaction_from_model)
            .collect()
    }
}

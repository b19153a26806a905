//! Fund persistence for [`PgFinanceStore`].

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tracing::debug;
use tsnt_core::finance::{
    CompletedTotals, FinanceError, Fund, FundLedgerSnapshot, FundRepository,
};
use tsnt_shared::types::{Amount, FundId};
use uuid::Uuid;

use super::convert::{fund_from_model, storage};
use super::finance_store::{PgFinanceStore, decrement, increment};
use crate::entities::{finance_transactions, funds};

// One statement, so the balance and the sums come from the same snapshot.
const LEDGER_SNAPSHOT_SQL: &str = r"
SELECT f.id,
       f.balance,
       f.opening_balance,
       COALESCE(SUM(t.amount) FILTER (WHERE t.type = 'income'), 0) AS income,
       COALESCE(SUM(t.amount) FILTER (WHERE t.type = 'expense'), 0) AS expense
FROM funds f
LEFT JOIN finance_transactions t
       ON t.fund_id = f.id AND t.status = 'completed'
WHERE f.id = $1
GROUP BY f.id, f.balance, f.opening_balance
";

#[derive(Debug, FromQueryResult)]
struct SnapshotRow {
    id: Uuid,
    balance: Decimal,
    opening_balance: Decimal,
    income: Decimal,
    expense: Decimal,
}

impl FundRepository for PgFinanceStore {
    async fn insert_fund(&self, fund: Fund) -> Result<Fund, FinanceError> {
        let model = funds::ActiveModel {
            id: Set(fund.id.into_inner()),
            name: Set(fund.name),
            balance: Set(fund.balance),
            opening_balance: Set(fund.opening_balance),
            currency: Set(fund.currency),
            account_num: Set(fund.account_num),
            created_at: Set(fund.created_at.into()),
            updated_at: Set(fund.updated_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage)?;
        Ok(fund_from_model(model))
    }

    async fn find_fund(&self, id: FundId) -> Result<Option<Fund>, FinanceError> {
        let model = funds::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(fund_from_model))
    }

    async fn list_funds(&self) -> Result<Vec<Fund>, FinanceError> {
        let models = funds::Entity::find()
            .order_by_asc(funds::Column::Name)
            .order_by_asc(funds::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(fund_from_model).collect())
    }

    async fn update_fund_metadata(&self, fund: Fund) -> Result<Fund, FinanceError> {
        let id = fund.id;
        funds::Entity::update_many()
            .set(funds::ActiveModel {
                name: Set(fund.name),
                currency: Set(fund.currency),
                account_num: Set(fund.account_num),
                updated_at: Set(fund.updated_at.into()),
                ..Default::default()
            })
            .filter(funds::Column::Id.eq(id.into_inner()))
            .exec_with_returning(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .next()
            .map(fund_from_model)
            .ok_or(FinanceError::FundNotFound(id))
    }

    async fn delete_fund(&self, id: FundId) -> Result<(), FinanceError> {
        let txn = self.db.begin().await.map_err(storage)?;

        // Row lock keeps new entries from attaching while we count.
        funds::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(storage)?
            .ok_or(FinanceError::FundNotFound(id))?;

        let count = finance_transactions::Entity::find()
            .filter(finance_transactions::Column::FundId.eq(id.into_inner()))
            .count(&txn)
            .await
            .map_err(storage)?;
        if count > 0 {
            return Err(FinanceError::FundHasTransactions { fund_id: id, count });
        }

        funds::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(storage)?;
        txn.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn increment_balance(&self, id: FundId, amount: Amount) -> Result<Fund, FinanceError> {
        increment(&self.db, id, amount).await.map(fund_from_model)
    }

    async fn decrement_balance(&self, id: FundId, amount: Amount) -> Result<Fund, FinanceError> {
        decrement(&self.db, id, amount).await.map(fund_from_model)
    }

    async fn override_balance(&self, id: FundId, new_balance: Decimal) -> Result<Fund, FinanceError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let current = funds::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(storage)?
            .ok_or(FinanceError::FundNotFound(id))?;

        let delta = new_balance - current.balance;
        let opening_balance = current.opening_balance + delta;
        debug!(fund_id = %id, %delta, "shifting opening balance");

        let mut fund: funds::ActiveModel = current.into();
        fund.balance = Set(new_balance);
        fund.opening_balance = Set(opening_balance);
        fund.updated_at = Set(Utc::now().into());
        let model = fund.update(&txn).await.map_err(storage)?;

        txn.commit().await.map_err(storage)?;
        Ok(fund_from_model(model))
    }

    async fn ledger_snapshot(&self, id: FundId) -> Result<Option<FundLedgerSnapshot>, FinanceError> {
        let row = SnapshotRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            LEDGER_SNAPSHOT_SQL,
            [id.into_inner().into()],
        ))
        .one(&self.db)
        .await
        .map_err(storage)?;

        Ok(row.map(|row| FundLedgerSnapshot {
            fund_id: FundId::from_uuid(row.id),
            balance: row.balance,
            opening_balance: row.opening_balance,
            totals: CompletedTotals {
                income: row.income,
                expense: row.expense,
            },
        }))
    }
}

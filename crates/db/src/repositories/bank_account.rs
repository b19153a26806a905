//! Bank account persistence for [`PgFinanceStore`].

use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tsnt_core::finance::{BankAccount, BankAccountRepository, BankAccountStatus, FinanceError};
use tsnt_shared::types::BankAccountId;

use super::convert::{bank_account_from_model, bank_account_to_active, storage};
use super::finance_store::PgFinanceStore;
use crate::entities::bank_accounts::{self, Column};
use crate::entities::sea_orm_active_enums;

impl BankAccountRepository for PgFinanceStore {
    async fn insert_bank_account(&self, account: BankAccount) -> Result<BankAccount, FinanceError> {
        let model = bank_account_to_active(&account)
            .insert(&self.db)
            .await
            .map_err(storage)?;
        Ok(bank_account_from_model(model))
    }

    async fn find_bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, FinanceError> {
        let model = bank_accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(bank_account_from_model))
    }

    async fn list_bank_accounts(&self, active_only: bool) -> Result<Vec<BankAccount>, FinanceError> {
        let mut query = bank_accounts::Entity::find();
        if active_only {
            query = query.filter(
                Column::Status.eq(sea_orm_active_enums::BankAccountStatus::from(
                    BankAccountStatus::Active,
                )),
            );
        }
        let models = query
            .order_by_asc(Column::BankName)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(bank_account_from_model).collect())
    }

    async fn update_bank_account(&self, account: BankAccount) -> Result<BankAccount, FinanceError> {
        let id = account.id;
        match bank_account_to_active(&account).update(&self.db).await {
            Ok(model) => Ok(bank_account_from_model(model)),
            Err(DbErr::RecordNotUpdated) => Err(FinanceError::BankAccountNotFound(id)),
            Err(err) => Err(storage(err)),
        }
    }

    async fn delete_bank_account(&self, id: BankAccountId) -> Result<(), FinanceError> {
        let result = bank_accounts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(FinanceError::BankAccountNotFound(id));
        }
        Ok(())
    }
}

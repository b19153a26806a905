//! User projection repository.
//!
//! Identity lives in a separate service; this table keeps the display fields
//! the ledger joins against.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tsnt_core::finance::UserSummary;
use tsnt_shared::types::UserId;

use super::convert::user_summary;
use crate::entities::users;

/// Repository for the users projection.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or refreshes a user's display fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(&self, user: &UserSummary) -> Result<UserSummary, DbErr> {
        let now = chrono::Utc::now();
        let model = users::ActiveModel {
            id: Set(user.id.into_inner()),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            full_name: Set(user.full_name.clone()),
            avatar: Set(user.avatar.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([
                        users::Column::Username,
                        users::Column::Email,
                        users::Column::FullName,
                        users::Column::Avatar,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", user.id)))
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<UserSummary>, DbErr> {
        let model = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.as_ref().map(user_summary))
    }

    /// Lists every user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<UserSummary>, DbErr> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await?;
        Ok(models.iter().map(user_summary).collect())
    }
}

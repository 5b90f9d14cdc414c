//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use tally_shared::AppError;
use tally_shared::types::UserId;
use tracing::info;
use uuid::Uuid;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Username is already registered.
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UsernameTaken(_) => Self::Conflict(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// User repository for registration and login lookups.
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

    /// Finds a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Checks if a username is already registered.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::UsernameTaken` when the unique constraint rejects
    /// the username.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<users::Model, UserError> {
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match user.insert(&self.db).await {
            Ok(model) => {
                info!(user_id = %model.id, username = %model.username, "User registered");
                Ok(model)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(UserError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

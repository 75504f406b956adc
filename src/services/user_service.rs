//! Domain service for user accounts.
//!
//! Owns the rules shared by the HTTP API and the CLI: input normalization,
//! uniqueness of usernames and emails, and password hashing on write.

use thiserror::Error;

use crate::models::user::{NewUser, User, UserChanges, UserPage, UserQuery};
use crate::validation::FieldError;

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound(i32),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<sea_orm::DbErr>().is_some() {
            Self::Database(format!("{err:#}"))
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

impl From<FieldError> for UserError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Domain service trait for user management.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user after validating input and checking uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::UsernameTaken`] or [`UserError::EmailTaken`] on conflict.
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserError>;

    async fn get_user(&self, id: i32) -> Result<User, UserError>;

    async fn list_users(&self, query: &UserQuery) -> Result<UserPage, UserError>;

    /// Applies a partial update. Uniqueness checks ignore the user itself.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<User, UserError>;

    /// Deletes a user and returns the removed id.
    async fn delete_user(&self, id: i32) -> Result<i32, UserError>;
}

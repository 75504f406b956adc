//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Store, is_unique_violation};
use crate::models::user::{NewUser, User, UserChanges, UserPage, UserQuery};
use crate::services::password::PasswordManager;
use crate::services::user_service::{UserError, UserService};
use crate::validation;

pub struct SeaOrmUserService {
    store: Store,
    passwords: PasswordManager,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordManager) -> Self {
        Self { store, passwords }
    }

    async fn ensure_available(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i32>,
    ) -> Result<(), UserError> {
        if let Some(username) = username
            && self.store.username_exists(username, exclude_id).await?
        {
            return Err(UserError::UsernameTaken);
        }
        if let Some(email) = email
            && self.store.email_exists(email, exclude_id).await?
        {
            return Err(UserError::EmailTaken);
        }
        Ok(())
    }

    /// A unique index violation means another writer got there between our
    /// existence check and the write. Re-run the check to name the field.
    async fn map_write_error(
        &self,
        err: anyhow::Error,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i32>,
    ) -> UserError {
        if !is_unique_violation(&err) {
            return UserError::from(err);
        }
        match self.ensure_available(username, email, exclude_id).await {
            Err(conflict) => conflict,
            Ok(()) => UserError::UsernameTaken,
        }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, mut new_user: NewUser) -> Result<User, UserError> {
        validation::prepare_new_user(&mut new_user)?;

        self.ensure_available(Some(&new_user.username), Some(&new_user.email), None)
            .await?;

        let password_hash = self.passwords.hash(&new_user.password).await?;

        match self.store.create_user(&new_user, password_hash).await {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "User created");
                Ok(user)
            }
            Err(e) => Err(self
                .map_write_error(e, Some(&new_user.username), Some(&new_user.email), None)
                .await),
        }
    }

    async fn get_user(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn list_users(&self, query: &UserQuery) -> Result<UserPage, UserError> {
        let (users, total) = self
            .store
            .list_users(query.skip, query.limit, query.search.as_deref())
            .await?;

        Ok(UserPage::new(users, total, query.skip, query.limit))
    }

    async fn update_user(&self, id: i32, mut changes: UserChanges) -> Result<User, UserError> {
        validation::prepare_changes(&mut changes)?;

        if self.store.get_user(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        self.ensure_available(
            changes.username.as_deref(),
            changes.email.as_deref(),
            Some(id),
        )
        .await?;

        let password_hash = match &changes.password {
            Some(password) => Some(self.passwords.hash(password).await?),
            None => None,
        };

        match self.store.update_user(id, &changes, password_hash).await {
            Ok(Some(user)) => {
                info!(user_id = id, "User updated");
                Ok(user)
            }
            Ok(None) => Err(UserError::NotFound(id)),
            Err(e) => Err(self
                .map_write_error(
                    e,
                    changes.username.as_deref(),
                    changes.email.as_deref(),
                    Some(id),
                )
                .await),
        }
    }

    async fn delete_user(&self, id: i32) -> Result<i32, UserError> {
        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, "User deleted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;

    async fn service() -> SeaOrmUserService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let passwords = PasswordManager::from_config(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap();
        SeaOrmUserService::new(store, passwords)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_hides_hash() {
        let service = service().await;
        let user = service
            .create_user(new_user("alice", "Alice@Example.com"))
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        let (_, hash) = service
            .store
            .get_user_by_username_with_password("alice")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(hash, "secret123");
    }

    #[tokio::test]
    async fn test_duplicates_are_conflicts() {
        let service = service().await;
        service
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = service
            .create_user(new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken));

        let err = service
            .create_user(new_user("bob", "ALICE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
    }

    #[tokio::test]
    async fn test_update_keeps_own_values() {
        let service = service().await;
        let alice = service
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        service
            .create_user(new_user("bob", "bob@example.com"))
            .await
            .unwrap();

        let same = UserChanges {
            username: Some("alice".to_string()),
            full_name: Some("Alice A.".to_string()),
            ..Default::default()
        };
        let updated = service.update_user(alice.id, same).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Alice A."));

        let taken = UserChanges {
            email: Some("bob@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_user(alice.id, taken).await,
            Err(UserError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let service = service().await;
        assert!(matches!(
            service.get_user(42).await,
            Err(UserError::NotFound(42))
        ));
        assert!(matches!(
            service.update_user(42, UserChanges::default()).await,
            Err(UserError::NotFound(42))
        ));
        assert!(matches!(
            service.delete_user(42).await,
            Err(UserError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_validation_error() {
        let service = service().await;
        let err = service
            .create_user(new_user("al", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(msg) if msg.starts_with("username")));
    }
}

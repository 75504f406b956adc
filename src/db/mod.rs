use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::user::{NewUser, User, UserChanges};

pub mod migrator;
pub mod repositories;

pub use repositories::user::is_unique_violation;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `sqlite::memory:` is a separate database,
        // so an in-memory store is pinned to one connection.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            // Recycling the only in-memory connection would drop the database
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn list_users(
        &self,
        skip: u64,
        limit: u64,
        search: Option<&str>,
    ) -> Result<(Vec<User>, u64)> {
        self.user_repo().list(skip, limit, search).await
    }

    pub async fn create_user(&self, new_user: &NewUser, password_hash: String) -> Result<User> {
        self.user_repo().create(new_user, password_hash).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        changes: &UserChanges,
        password_hash: Option<String>,
    ) -> Result<Option<User>> {
        self.user_repo().update(id, changes, password_hash).await
    }

    pub async fn update_user_password(&self, username: &str, password_hash: String) -> Result<()> {
        self.user_repo()
            .update_password(username, password_hash)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().username_exists(username, exclude_id).await
    }

    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().email_exists(email, exclude_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "unused".to_string(),
            full_name: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let store = memory_store().await;
        let created = store
            .create_user(&new_user("alice", "alice@example.com"), "hash".to_string())
            .await
            .unwrap();

        let fetched = store.get_user(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let (_, hash) = store
            .get_user_by_username_with_password("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let store = memory_store().await;
        store
            .create_user(&new_user("alice", "alice@example.com"), "hash".to_string())
            .await
            .unwrap();

        let err = store
            .create_user(&new_user("alice", "other@example.com"), "hash".to_string())
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_exists_checks_honor_exclusion() {
        let store = memory_store().await;
        let alice = store
            .create_user(&new_user("alice", "alice@example.com"), "hash".to_string())
            .await
            .unwrap();

        assert!(store.username_exists("alice", None).await.unwrap());
        assert!(!store.username_exists("alice", Some(alice.id)).await.unwrap());
        assert!(store.email_exists("alice@example.com", None).await.unwrap());
        assert!(
            !store
                .email_exists("alice@example.com", Some(alice.id))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_with_search_and_paging() {
        let store = memory_store().await;
        for name in ["alice", "bob", "carol", "alina"] {
            store
                .create_user(
                    &new_user(name, &format!("{name}@example.com")),
                    "hash".to_string(),
                )
                .await
                .unwrap();
        }

        let (page, total) = store.list_users(0, 2, None).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username, "alice");

        let (page, total) = store.list_users(0, 10, Some("ali")).await.unwrap();
        assert_eq!(total, 2);
        assert!(page.iter().all(|u| u.username.starts_with("ali")));
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let store = memory_store().await;
        let alice = store
            .create_user(&new_user("alice", "alice@example.com"), "hash".to_string())
            .await
            .unwrap();

        let changes = UserChanges {
            full_name: Some("Alice Liddell".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_user(alice.id, &changes, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Alice Liddell"));
        assert_eq!(updated.email, alice.email);

        assert!(store.update_user(999, &changes, None).await.unwrap().is_none());

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(!store.delete_user(alice.id).await.unwrap());
        assert!(store.get_user(alice.id).await.unwrap().is_none());
    }
}

//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::user::User;
use crate::services::auth_service::{AuthError, AuthService, TokenPair};
use crate::services::password::PasswordManager;
use crate::services::tokens::{TokenError, TokenIssuer, TokenKind};
use crate::validation;

pub struct SeaOrmAuthService {
    store: Store,
    passwords: PasswordManager,
    tokens: TokenIssuer,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordManager, tokens: TokenIssuer) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    async fn active_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = self.store.get_user_by_username(username).await?;
        Ok(user.filter(|u| u.is_active))
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
        else {
            debug!(username, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &password_hash).await? {
            debug!(username, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            debug!(username, "Login attempt for inactive user");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access = self.tokens.issue(&user.username, TokenKind::Access);
        let refresh = self.tokens.issue(&user.username, TokenKind::Refresh);

        match (access, refresh) {
            (Ok(access), Ok(refresh)) => Ok(TokenPair::new(access, refresh)),
            (Err(e), _) | (_, Err(e)) => Err(AuthError::Internal(e.to_string())),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if self.active_user(&claims.sub).await?.is_none() {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.tokens
            .issue(&claims.sub, TokenKind::Access)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|e| match e {
                TokenError::Encoding(msg) => AuthError::Internal(msg),
                TokenError::Invalid | TokenError::WrongKind { .. } => AuthError::InvalidToken,
            })?;

        self.active_user(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validation::validate_password(new_password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let (_, password_hash) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !self
            .passwords
            .verify(current_password, &password_hash)
            .await?
        {
            return Err(AuthError::IncorrectPassword);
        }

        let new_hash = self.passwords.hash(new_password).await?;
        self.store.update_user_password(username, new_hash).await?;

        info!(username, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::models::user::{NewUser, UserChanges};
    use chrono::Duration;

    async fn setup() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let passwords = PasswordManager::from_config(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap();
        let tokens = TokenIssuer::new(
            b"unit-test-secret-key",
            Duration::minutes(15),
            Duration::days(7),
        );

        let hash = passwords.hash("secret123").await.unwrap();
        store
            .create_user(
                &NewUser {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    password: String::new(),
                    full_name: None,
                    is_active: true,
                },
                hash,
            )
            .await
            .unwrap();

        SeaOrmAuthService::new(store, passwords, tokens)
    }

    #[tokio::test]
    async fn test_authenticate() {
        let auth = setup().await;
        assert!(auth.authenticate("alice", "secret123").await.is_ok());
        assert!(matches!(
            auth.authenticate("alice", "nope-nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "secret123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_login() {
        let auth = setup().await;
        let user = auth.store.get_user_by_username("alice").await.unwrap().unwrap();
        let changes = UserChanges {
            is_active: Some(false),
            ..Default::default()
        };
        auth.store.update_user(user.id, &changes, None).await.unwrap();

        assert!(matches!(
            auth.authenticate("alice", "secret123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_flow() {
        let auth = setup().await;
        let user = auth.authenticate("alice", "secret123").await.unwrap();
        let pair = auth.issue_tokens(&user).unwrap();
        assert_eq!(pair.token_type, "bearer");

        let me = auth.current_user(&pair.access_token).await.unwrap();
        assert_eq!(me.username, "alice");

        let access = auth.refresh(&pair.refresh_token).await.unwrap();
        assert!(auth.current_user(&access).await.is_ok());

        assert!(matches!(
            auth.refresh(&pair.access_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(matches!(
            auth.current_user(&pair.refresh_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = setup().await;

        assert!(matches!(
            auth.change_password("alice", "wrong-one", "newsecret").await,
            Err(AuthError::IncorrectPassword)
        ));
        assert!(matches!(
            auth.change_password("alice", "secret123", "secret123").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.change_password("alice", "secret123", "abc").await,
            Err(AuthError::Validation(_))
        ));

        auth.change_password("alice", "secret123", "newsecret")
            .await
            .unwrap();
        assert!(auth.authenticate("alice", "newsecret").await.is_ok());
        assert!(auth.authenticate("alice", "secret123").await.is_err());
    }
}

//! Session-based authentication.
//!
//! Users register or log in with a username and password; both return a
//! session token that the [`crate::middleware::require_user`] gate resolves
//! back to a [`UserId`] on later requests. Passwords are stored as Argon2
//! PHC strings.

use crate::error::ApiError;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use wallflow_core::{NewUser, User, UserId};
use wallflow_store::UserRepository;

/// Maps a presented session token to the user it belongs to.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `None` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> Option<UserId>;
}

/// An open session returned by register and login.
#[derive(Debug, Clone)]
pub struct Login {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// In-memory session table backed by the user repository.
pub struct SessionAuthenticator {
    users: Arc<dyn UserRepository>,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
    /// Serializes the lookup-then-create in `register`.
    register_lock: Mutex<()>,
}

impl SessionAuthenticator {
    pub fn new(users: Arc<dyn UserRepository>, ttl: Duration) -> Self {
        Self {
            users,
            ttl,
            sessions: RwLock::new(HashMap::new()),
            register_lock: Mutex::new(()),
        }
    }

    /// Session lifetime in whole seconds, for cookie `Max-Age`.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Create a user and open a session for it.
    pub async fn register(&self, username: &str, password: &str) -> Result<Login, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username must not be empty"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password must not be empty"));
        }

        let hash = hash_password(password.to_string()).await?;

        let _guard = self.register_lock.lock().await;
        if self.users.get_user_by_username(username).await?.is_some() {
            return Err(ApiError::validation("username already exists"));
        }

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                password: hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");
        let token = self.open_session(user.id).await;
        Ok(Login { user, token })
    }

    /// Check credentials and open a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Login, ApiError> {
        let user = self
            .users
            .get_user_by_username(username.trim())
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password.clone()).await? {
            tracing::debug!(username = %user.username, "Rejected login");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.open_session(user.id).await;
        Ok(Login { user, token })
    }

    /// Drop the session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        if self.sessions.write().await.remove(token).is_some() {
            tracing::debug!("Closed session");
        }
    }

    /// Number of sessions currently held, expired ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Expired sessions are pruned here, so the table stays bounded by the
    /// number of live sessions plus the one being opened.
    async fn open_session(&self, user_id: UserId) -> String {
        let now = Utc::now();
        let token = Uuid::new_v4().to_string();
        let session = Session {
            user_id,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        if sessions.len() < before {
            tracing::debug!(evicted = before - sessions.len(), "Pruned expired sessions");
        }
        sessions.insert(token.clone(), session);
        token
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    async fn resolve(&self, token: &str) -> Option<UserId> {
        let session = self.sessions.read().await.get(token).copied()?;
        if Utc::now() < session.expires_at {
            return Some(session.user_id);
        }

        self.sessions.write().await.remove(token);
        tracing::debug!(user_id = %session.user_id, "Evicted expired session");
        None
    }
}

/// Argon2 is CPU-bound; both helpers run on the blocking pool.
async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
    })
    .await
    .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))?
    .map_err(ApiError::from)
}

async fn verify_password(password: String, stored: String) -> Result<bool, ApiError> {
    let verified = tokio::task::spawn_blocking(move || match PasswordHash::new(&stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            false
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!("password check task failed: {e}"))?;
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallflow_store::StoreHandles;

    fn authenticator(ttl: Duration) -> SessionAuthenticator {
        SessionAuthenticator::new(StoreHandles::in_memory().users, ttl)
    }

    #[tokio::test]
    async fn test_register_then_resolve() {
        let auth = authenticator(Duration::hours(24));
        let login = auth.register("alice", "secret").await.unwrap();

        assert_eq!(login.user.username, "alice");
        assert_ne!(login.user.password, "secret");
        assert!(login.user.password.starts_with("$argon2"));
        assert_eq!(auth.resolve(&login.token).await, Some(login.user.id));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_and_duplicate() {
        let auth = authenticator(Duration::hours(24));
        assert!(matches!(
            auth.register("  ", "pw").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            auth.register("bob", "").await,
            Err(ApiError::Validation(_))
        ));

        auth.register("bob", "pw").await.unwrap();
        assert!(matches!(
            auth.register("bob", "other").await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let auth = authenticator(Duration::hours(24));
        let registered = auth.register("carol", "right").await.unwrap();

        let login = auth.login("carol", "right").await.unwrap();
        assert_eq!(login.user.id, registered.user.id);
        assert_ne!(login.token, registered.token);

        assert!(matches!(
            auth.login("carol", "wrong").await,
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "right").await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let auth = authenticator(Duration::hours(24));
        let login = auth.register("dave", "pw").await.unwrap();

        auth.logout(&login.token).await;
        assert_eq!(auth.resolve(&login.token).await, None);

        // Unknown token is a no-op.
        auth.logout("not-a-session").await;
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let auth = authenticator(Duration::zero());
        let login = auth.register("erin", "pw").await.unwrap();
        assert_eq!(auth.session_count().await, 1);

        assert_eq!(auth.resolve(&login.token).await, None);
        assert_eq!(auth.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unused_expired_sessions_are_reclaimed() {
        let auth = authenticator(Duration::zero());
        auth.register("gina", "pw").await.unwrap();
        for _ in 0..20 {
            auth.login("gina", "pw").await.unwrap();
        }

        // Only the session opened last is left; none was ever resolved.
        assert_eq!(auth.session_count().await, 1);
        assert_eq!(auth.cleanup().await, 1);
        assert_eq!(auth.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_sessions() {
        let auth = authenticator(Duration::hours(1));
        let login = auth.register("hank", "pw").await.unwrap();
        auth.login("hank", "pw").await.unwrap();

        assert_eq!(auth.cleanup().await, 0);
        assert_eq!(auth.session_count().await, 2);
        assert_eq!(auth.resolve(&login.token).await, Some(login.user.id));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_password_work_leaves_runtime_free() {
        let auth = authenticator(Duration::hours(1));
        auth.register("iris", "pw").await.unwrap();

        let order = std::sync::Mutex::new(Vec::new());
        tokio::join!(
            async {
                auth.login("iris", "pw").await.unwrap();
                order.lock().unwrap().push("login");
            },
            async {
                tokio::task::yield_now().await;
                order.lock().unwrap().push("tick");
            },
        );

        assert_eq!(*order.lock().unwrap(), vec!["tick", "login"]);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let auth = authenticator(Duration::hours(1));
        assert_eq!(auth.resolve("nope").await, None);
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let auth = Arc::new(authenticator(Duration::hours(1)));
        let mut tasks = Vec::new();
        for _ in 0..4 {
            let auth = auth.clone();
            tasks.push(tokio::spawn(async move {
                auth.register("frank", "pw").await.is_ok()
            }));
        }

        let mut wins = 0;
        for task in tasks {
            if task.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}

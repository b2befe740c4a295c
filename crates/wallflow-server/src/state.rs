//! Shared application state.

use crate::auth::{Authenticator, SessionAuthenticator};
use chrono::Duration;
use std::sync::Arc;
use wallflow_core::{AuthConfig, WallflowConfig};
use wallflow_store::{FavoritesRepository, StoreHandles, UserRepository};

/// Handle passed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WallflowConfig,
    favorites: Arc<dyn FavoritesRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionAuthenticator>,
    /// Resolves tokens for the gated routes. Defaults to `sessions`.
    gate: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(config: WallflowConfig, store: StoreHandles) -> Self {
        let sessions = Arc::new(SessionAuthenticator::new(
            store.users.clone(),
            session_ttl(&config.auth),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                favorites: store.favorites,
                users: store.users,
                gate: sessions.clone(),
                sessions,
            }),
        }
    }

    /// Replace the token resolver used by the gated routes.
    pub fn with_authenticator(self, gate: Arc<dyn Authenticator>) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(AppStateInner {
                config: inner.config.clone(),
                favorites: inner.favorites.clone(),
                users: inner.users.clone(),
                sessions: inner.sessions.clone(),
                gate,
            }),
        }
    }

    pub fn config(&self) -> &WallflowConfig {
        &self.inner.config
    }

    pub fn favorites(&self) -> &dyn FavoritesRepository {
        self.inner.favorites.as_ref()
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    pub fn sessions(&self) -> &SessionAuthenticator {
        &self.inner.sessions
    }

    pub fn gate(&self) -> &dyn Authenticator {
        self.inner.gate.as_ref()
    }

    pub fn cookie_name(&self) -> &str {
        &self.inner.config.auth.cookie_name
    }
}

/// Longer configured lifetimes are clamped to ten years.
const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn session_ttl(config: &AuthConfig) -> Duration {
    Duration::seconds(config.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as i64)
}

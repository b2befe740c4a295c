//! Repository traits and backend selection.

use crate::error::StoreError;
use crate::file::FileStore;
use crate::memory::MemoryStore;
use async_trait::async_trait;
use std::sync::Arc;
use wallflow_core::{Favorite, FavoriteId, NewFavorite, NewUser, StoreBackend, StoreConfig, User, UserId};

/// Per-user favorite images.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Allocate the next id and store the favorite. Duplicates are allowed.
    async fn add_favorite(
        &self,
        user_id: UserId,
        favorite: NewFavorite,
    ) -> Result<Favorite, StoreError>;

    /// All favorites owned by `user_id`, oldest first.
    async fn get_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StoreError>;

    /// Delete `id` if it exists and belongs to `user_id`. Anything else is a
    /// silent no-op, so repeated calls are harmless.
    async fn remove_favorite(&self, id: FavoriteId, user_id: UserId) -> Result<(), StoreError>;
}

/// Registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Store a new user. Username uniqueness is the caller's job.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Both repository views of one backend.
#[derive(Clone)]
pub struct StoreHandles {
    pub favorites: Arc<dyn FavoritesRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl StoreHandles {
    /// Share one backend through both traits.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: FavoritesRepository + UserRepository + 'static,
    {
        Self {
            favorites: backend.clone(),
            users: backend,
        }
    }

    /// A fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }
}

/// Create a storage backend based on configuration.
pub fn create_store(config: &StoreConfig) -> Result<StoreHandles, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store; favorites are lost on restart");
            Ok(StoreHandles::in_memory())
        }
        StoreBackend::File => {
            let store = FileStore::open(&config.path)?;
            tracing::info!(path = %config.path.display(), "Using file-backed store");
            Ok(StoreHandles::from_backend(Arc::new(store)))
        }
    }
}

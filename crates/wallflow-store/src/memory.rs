//! In-memory storage backend.

use crate::error::StoreError;
use crate::repository::{FavoritesRepository, UserRepository};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use wallflow_core::{Favorite, FavoriteId, NewFavorite, NewUser, User, UserId};

/// Users, favorites and their id counters.
///
/// Shared by both backends: the file store journals a mutation and then
/// applies it here, and replays the journal through the same methods.
#[derive(Debug)]
pub(crate) struct Tables {
    users: BTreeMap<UserId, User>,
    favorites: BTreeMap<FavoriteId, Favorite>,
    next_user_id: u64,
    next_favorite_id: u64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            favorites: BTreeMap::new(),
            next_user_id: 1,
            next_favorite_id: 1,
        }
    }
}

impl Tables {
    pub(crate) fn next_user_id(&self) -> UserId {
        UserId(self.next_user_id)
    }

    pub(crate) fn next_favorite_id(&self) -> FavoriteId {
        FavoriteId(self.next_favorite_id)
    }

    /// Insert a user under a known id and keep the counter ahead of it.
    pub(crate) fn insert_user(&mut self, user: User) {
        self.next_user_id = self.next_user_id.max(user.id.0 + 1);
        self.users.insert(user.id, user);
    }

    /// Insert a favorite under a known id and keep the counter ahead of it.
    pub(crate) fn insert_favorite(&mut self, favorite: Favorite) {
        self.next_favorite_id = self.next_favorite_id.max(favorite.id.0 + 1);
        self.favorites.insert(favorite.id, favorite);
    }

    /// Whether `id` exists and is owned by `user_id`.
    pub(crate) fn owns(&self, id: FavoriteId, user_id: UserId) -> bool {
        self.favorites
            .get(&id)
            .is_some_and(|f| f.user_id == user_id)
    }

    /// Remove `id` when owned by `user_id`; returns whether a row went away.
    pub(crate) fn remove_owned(&mut self, id: FavoriteId, user_id: UserId) -> bool {
        if self.owns(id, user_id) {
            self.favorites.remove(&id);
            true
        } else {
            false
        }
    }

    pub(crate) fn favorites_of(&self, user_id: UserId) -> Vec<Favorite> {
        self.favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect()
    }

    pub(crate) fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub(crate) fn user_by_username(&self, username: &str) -> Option<User> {
        self.users.values().find(|u| u.username == username).cloned()
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.users.len(), self.favorites.len())
    }
}

/// Process-lifetime store. Ids restart at 1 on every launch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesRepository for MemoryStore {
    async fn add_favorite(
        &self,
        user_id: UserId,
        favorite: NewFavorite,
    ) -> Result<Favorite, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Lock)?;
        let favorite = Favorite {
            id: tables.next_favorite_id(),
            user_id,
            image_url: favorite.image_url,
            title: favorite.title,
        };
        tables.insert_favorite(favorite.clone());
        Ok(favorite)
    }

    async fn get_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Lock)?;
        Ok(tables.favorites_of(user_id))
    }

    async fn remove_favorite(&self, id: FavoriteId, user_id: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Lock)?;
        if tables.remove_owned(id, user_id) {
            tracing::debug!(favorite_id = %id, user_id = %user_id, "Removed favorite");
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Lock)?;
        Ok(tables.user(id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Lock)?;
        Ok(tables.user_by_username(username))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Lock)?;
        let user = User {
            id: tables.next_user_id(),
            username: user.username,
            password: user.password,
        };
        tables.insert_user(user.clone());
        Ok(user)
    }
}

//! # wallflow-store
//!
//! Persistence for users and their favorite images.
//!
//! Callers depend on the [`FavoritesRepository`] and [`UserRepository`]
//! traits only; the backend is picked at startup by [`create_store`]:
//!
//! | Backend | Durability |
//! |---------|------------|
//! | [`MemoryStore`] | process lifetime |
//! | [`FileStore`] | JSON Lines journal, replayed on open |
//!
//! All mutations go through a single write lock, so id allocation and
//! ownership checks never interleave. Reads share the lock.

pub mod error;
pub mod file;
pub mod memory;
pub mod repository;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::{FavoritesRepository, StoreHandles, UserRepository, create_store};

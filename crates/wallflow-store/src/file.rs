//! File-backed storage.
//!
//! Every mutation is appended to a JSON Lines journal (one record per line)
//! before it is applied in memory. Opening the store replays the journal,
//! which rebuilds both tables and moves the id counters past every id seen,
//! so ids stay unique across restarts.

use crate::error::StoreError;
use crate::memory::Tables;
use crate::repository::{FavoritesRepository, UserRepository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use wallflow_core::{Favorite, FavoriteId, NewFavorite, NewUser, User, UserId};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalRecord {
    CreateUser {
        id: UserId,
        username: String,
        password: String,
    },
    AddFavorite {
        favorite: Favorite,
    },
    RemoveFavorite {
        id: FavoriteId,
        user_id: UserId,
    },
}

impl JournalRecord {
    fn apply(self, tables: &mut Tables) {
        match self {
            JournalRecord::CreateUser {
                id,
                username,
                password,
            } => tables.insert_user(User {
                id,
                username,
                password,
            }),
            JournalRecord::AddFavorite { favorite } => tables.insert_favorite(favorite),
            JournalRecord::RemoveFavorite { id, user_id } => {
                tables.remove_owned(id, user_id);
            }
        }
    }
}

/// Append side of the journal.
///
/// Each record goes out as a single `write_all` of the line plus its
/// newline. If a write fails part way, or the file was left mid-line by a
/// crash, the next record starts with a newline so it never lands on the
/// torn line.
struct Journal<W> {
    out: W,
    torn: bool,
}

impl<W: Write> Journal<W> {
    fn new(out: W, torn: bool) -> Self {
        Self { out, torn }
    }

    fn append(&mut self, json: &str) -> io::Result<()> {
        let mut line = String::with_capacity(json.len() + 2);
        if self.torn {
            line.push('\n');
        }
        line.push_str(json);
        line.push('\n');

        self.torn = true;
        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        self.torn = false;
        Ok(())
    }
}

/// Whether a non-empty file lacks a trailing newline.
fn ends_mid_line(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Journal-backed store.
pub struct FileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
    journal: Mutex<Journal<File>>,
}

impl FileStore {
    /// Open (or create) the journal at `path` and replay it.
    ///
    /// Missing parent directories are created. Lines that fail to parse are
    /// skipped with a warning rather than failing the whole load.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tables = Self::replay(&path)?;
        let (users, favorites) = tables.counts();
        tracing::info!(
            path = %path.display(),
            users,
            favorites,
            "Loaded store journal"
        );

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let torn = ends_mid_line(&path)?;
        if torn {
            tracing::warn!(path = %path.display(), "Journal ends mid-line; next record starts on a new line");
        }

        Ok(Self {
            path,
            tables: RwLock::new(tables),
            journal: Mutex::new(Journal::new(file, torn)),
        })
    }

    /// Path of the backing journal.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> Result<Tables, StoreError> {
        let mut tables = Tables::default();
        if !path.exists() {
            return Ok(tables);
        }

        let reader = BufReader::new(File::open(path)?);
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => record.apply(&mut tables),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse journal record on line {} of {}: {}",
                        line_num + 1,
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(tables)
    }

    fn append(&self, record: &JournalRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let mut journal = self.journal.lock().map_err(|_| StoreError::Lock)?;
        journal.append(&json)?;
        Ok(())
    }
}

#[async_trait]
impl FavoritesRepository for FileStore {
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
        self.append(&JournalRecord::AddFavorite {
            favorite: favorite.clone(),
        })?;
        tables.insert_favorite(favorite.clone());
        Ok(favorite)
    }

    async fn get_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Lock)?;
        Ok(tables.favorites_of(user_id))
    }

    async fn remove_favorite(&self, id: FavoriteId, user_id: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Lock)?;
        if !tables.owns(id, user_id) {
            return Ok(());
        }
        self.append(&JournalRecord::RemoveFavorite { id, user_id })?;
        tables.remove_owned(id, user_id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FileStore {
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
        self.append(&JournalRecord::CreateUser {
            id: user.id,
            username: user.username.clone(),
            password: user.password.clone(),
        })?;
        tables.insert_user(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reopen_restores_state_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");

        {
            let store = FileStore::open(&path).unwrap();
            let user = store
                .create_user(NewUser {
                    username: "alice".to_string(),
                    password: "hash".to_string(),
                })
                .await
                .unwrap();
            let a = store
                .add_favorite(user.id, NewFavorite::new("http://x/a.jpg", "A"))
                .await
                .unwrap();
            store
                .add_favorite(user.id, NewFavorite::new("http://x/b.jpg", "B"))
                .await
                .unwrap();
            store.remove_favorite(a.id, user.id).await.unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let alice = store.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.password, "hash");

        let favorites = store.get_favorites(alice.id).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "B");

        let c = store
            .add_favorite(alice.id, NewFavorite::new("http://x/c.jpg", "C"))
            .await
            .unwrap();
        assert_eq!(c.id, FavoriteId(3));

        let bob = store
            .create_user(NewUser {
                username: "bob".to_string(),
                password: "hash2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(bob.id, UserId(2));
    }

    #[tokio::test]
    async fn test_foreign_remove_is_not_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        let store = FileStore::open(&path).unwrap();

        let theirs = store
            .add_favorite(UserId(2), NewFavorite::new("http://x/a.jpg", "A"))
            .await
            .unwrap();
        store.remove_favorite(theirs.id, UserId(1)).await.unwrap();
        store.remove_favorite(FavoriteId(99), UserId(1)).await.unwrap();

        let lines = fs::read_to_string(&path).unwrap();
        assert_eq!(lines.lines().count(), 1);
        assert_eq!(store.get_favorites(UserId(2)).await.unwrap(), vec![theirs]);
    }

    #[tokio::test]
    async fn test_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"op":"add_favorite","favorite":{"id":4,"userId":1,"imageUrl":"http://x/a.jpg","title":"A"}}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"op":"unknown"}"#,
                "\n",
            ),
        )
        .unwrap();

        let store = FileStore::open(&path).unwrap();
        let favorites = store.get_favorites(UserId(1)).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, FavoriteId(4));

        let next = store
            .add_favorite(UserId(1), NewFavorite::new("http://x/b.jpg", "B"))
            .await
            .unwrap();
        assert_eq!(next.id, FavoriteId(5));
    }

    /// Accepts `budget` bytes, then fails every write until refilled.
    struct FlakyWriter {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(self.budget);
            self.written.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_after_failed_write_gets_its_own_line() {
        let mut journal = Journal::new(
            FlakyWriter {
                written: Vec::new(),
                budget: 10,
            },
            false,
        );

        assert!(journal.append(r#"{"op":"remove_favorite","id":1,"user_id":1}"#).is_err());
        journal.out.budget = usize::MAX;
        journal.append(r#"{"op":"remove_favorite","id":2,"user_id":1}"#).unwrap();

        let text = String::from_utf8(journal.out.written).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"op":"remove_favorite","id":2,"user_id":1}"#);
        assert!(serde_json::from_str::<JournalRecord>(lines[1]).is_ok());
    }

    #[tokio::test]
    async fn test_append_after_torn_tail_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"op":"add_favorite","favorite":{"id":1,"userId":1,"imageUrl":"http://x/a.jpg","title":"A"}}"#,
                "\n",
                r#"{"op":"add_favorite","favo"#,
            ),
        )
        .unwrap();

        {
            let store = FileStore::open(&path).unwrap();
            store
                .add_favorite(UserId(1), NewFavorite::new("http://x/b.jpg", "B"))
                .await
                .unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let titles: Vec<String> = store
            .get_favorites(UserId(1))
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}

//! String-keyed blob store contract and implementations.
//!
//! # Invariants
//! - Values are opaque strings; the store never parses them.
//! - `write_batch` on the SQLite store commits all puts and removals or none.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Persistent mapping from string keys to string blobs.
pub trait BlobRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;

    /// Writes `puts` then deletes `removals`. The default applies them one
    /// at a time, so an interruption can leave a prefix applied.
    fn write_batch(&self, puts: &[(&str, String)], removals: &[&str]) -> RepoResult<()> {
        for (key, value) in puts {
            self.put(key, value)?;
        }
        for key in removals {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl<R: BlobRepository + ?Sized> BlobRepository for &R {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }

    fn write_batch(&self, puts: &[(&str, String)], removals: &[&str]) -> RepoResult<()> {
        (**self).write_batch(puts, removals)
    }
}

/// Process-local blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobRepository {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryBlobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`, e.g. a board saved by an older build.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Sorted snapshot of all keys.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl BlobRepository for MemoryBlobRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// SQLite-backed blob store over the `blob_entries` table.
pub struct SqliteBlobRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlobRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// Fails when the connection was not migrated to the latest schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected = latest_version();
        let actual = current_user_version(conn)?;
        if actual != expected {
            return Err(DbError::NotMigrated {
                found: actual,
                expected,
            }
            .into());
        }
        Ok(Self { conn })
    }
}

impl BlobRepository for SqliteBlobRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM blob_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        upsert(self.conn, key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        delete(self.conn, key)
    }

    fn write_batch(&self, puts: &[(&str, String)], removals: &[&str]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (key, value) in puts {
            upsert(&tx, key, value)?;
        }
        for key in removals {
            delete(&tx, key)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn delete(conn: &Connection, key: &str) -> RepoResult<()> {
    conn.execute("DELETE FROM blob_entries WHERE key = ?1;", [key])?;
    Ok(())
}

fn upsert(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO blob_entries (key, value)
         VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

//! SQLite file that backs `SqliteBlobRepository`.
//!
//! The database holds a single `blob_entries` table of key/value strings.
//! Its layout version lives in `PRAGMA user_version` and is independent of
//! the board's own `schemaVersion` blob.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating the blob database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer build; its table layout is unknown.
    NewerDatabase { found: u32, supported: u32 },
    /// Connection did not go through `open_db*`, so `blob_entries` may be
    /// missing or outdated.
    NotMigrated { found: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "blob database error: {err}"),
            Self::NewerDatabase { found, supported } => write!(
                f,
                "blob database layout v{found} is newer than this build (v{supported})"
            ),
            Self::NotMigrated { found, expected } => write!(
                f,
                "blob database is at layout v{found}, expected v{expected}; open it with open_db"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

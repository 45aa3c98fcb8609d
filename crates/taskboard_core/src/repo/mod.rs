//! Persistence layer.
//!
//! # Responsibility
//! - Define the string-keyed blob store contract and its implementations.
//! - Encode and decode the board state against that store with a
//!   versioned schema.
//!
//! # Invariants
//! - Repositories return transport errors only; malformed stored values
//!   are handled by the board codec, not reported as repository failures.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod blob_repo;
pub mod board_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Board value could not be encoded as JSON.
    Encode(serde_json::Error),
    /// Stored `schemaVersion` is newer than this build understands.
    UnsupportedSchemaVersion { stored: u32, latest_supported: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode board value: {err}"),
            Self::UnsupportedSchemaVersion {
                stored,
                latest_supported,
            } => write!(
                f,
                "stored board schema version {stored} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

//! SQLite storage for the notes table.
//!
//! # Responsibility
//! - Open file or in-memory connections configured for the store.
//! - Create the single fixed notes schema on first open.
//!
//! # Invariants
//! - `PRAGMA user_version` is `0` (fresh) or `SCHEMA_VERSION`; anything else
//!   is refused.
//! - No note is read or written through a connection before `ensure_schema`.

mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{ensure_schema, schema_version, SCHEMA_VERSION};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a build with a different notes schema.
    ForeignSchema { found: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::ForeignSchema { found } => write!(
                f,
                "notes schema version {found} is not supported (expected {SCHEMA_VERSION})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ForeignSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

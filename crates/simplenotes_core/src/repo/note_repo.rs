//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and ordered listing over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `list_notes` is ordered by `createdDate DESC, id DESC`.
//! - `update_note` never touches `id` or `createdDate`.
//! - Rows are returned as stored; only values of the wrong SQL type are
//!   rejected, as `InvalidData`.

use crate::db::{schema_version, DbError, SCHEMA_VERSION};
use crate::model::note::{Note, NoteDraft, NoteId};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTES_TABLE: &str = "notes";
const NOTE_COLUMNS: [&str; 4] = ["id", "title", "content", "createdDate"];

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    createdDate
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Persists a draft and returns the newly assigned id.
    fn insert_note(&self, draft: &NoteDraft, created_date: i64) -> RepoResult<NoteId>;
    /// Replaces title/content of an existing note.
    fn update_note(&self, id: NoteId, draft: &NoteDraft) -> RepoResult<()>;
    /// Hard-deletes one note.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists every note, newest first.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Returns the number of stored notes.
    fn count_notes(&self) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the notes layout.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Constructs a repository over a connection already checked by `try_new`.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, draft: &NoteDraft, created_date: i64) -> RepoResult<NoteId> {
        self.conn.execute(
            "INSERT INTO notes (title, content, createdDate) VALUES (?1, ?2, ?3);",
            params![draft.title(), draft.content(), created_date],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_note(&self, id: NoteId, draft: &NoteDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3
             WHERE id = ?1;",
            params![id, draft.title(), draft.content()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{NOTE_SELECT_SQL} ORDER BY createdDate DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: column(row, "id")?,
        title: column(row, "title")?,
        content: column(row, "content")?,
        created_date: column(row, "createdDate")?,
    })
}

fn column<T: FromSql>(row: &Row<'_>, name: &'static str) -> RepoResult<T> {
    row.get(name).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, _, found) => {
            RepoError::InvalidData(format!("notes.{name} holds {found} value"))
        }
        rusqlite::Error::FromSqlConversionFailure(_, _, cause) => {
            RepoError::InvalidData(format!("notes.{name}: {cause}"))
        }
        other => RepoError::from(other),
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = SCHEMA_VERSION;
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, NOTES_TABLE)? {
        return Err(RepoError::MissingRequiredTable(NOTES_TABLE));
    }

    for column in NOTE_COLUMNS {
        if !table_has_column(conn, NOTES_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: NOTES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

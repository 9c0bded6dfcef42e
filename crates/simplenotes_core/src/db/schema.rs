//! Fixed notes schema, stamped into `PRAGMA user_version`.

use super::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Version written to `user_version` once the notes table exists.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_NOTES_SQL: &str = include_str!("schema.sql");

/// Creates the notes table on a fresh database; accepts an existing one.
///
/// # Errors
/// - `DbError::ForeignSchema` when `user_version` is neither `0` nor
///   `SCHEMA_VERSION`.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => create_schema(conn),
        SCHEMA_VERSION => Ok(()),
        found => Err(DbError::ForeignSchema { found }),
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn create_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_NOTES_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    info!("event=schema_create module=db status=ok version={SCHEMA_VERSION}");
    Ok(())
}

//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note use cases to Dart via FRB.
//! - Resolve the database location once and share one store per process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store-backed functions are not `sync`; FRB runs them on its worker
//!   pool, never on the UI thread.
//! - Failures come back as envelopes carrying a stable `error_kind`.

use log::warn;
use simplenotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, DateFormatter,
    ErrorKind, Note, NoteDraft, NoteId, NoteStore, StoreError,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

const DB_FILE_NAME: &str = "simplenotes.sqlite3";
const DB_PATH_ENV: &str = "SIMPLENOTES_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note as shown by the list and viewer screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds.
    pub created_date: i64,
    /// `dd.MM.yyyy HH:mm` in UTC.
    pub formatted_date: String,
}

/// Result envelope for create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Affected note id on success.
    pub note_id: Option<i64>,
    /// `not_found|validation_failed|storage_fault` on failure.
    pub error_kind: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: NoteId) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id),
            error_kind: None,
            message: message.into(),
        }
    }

    fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            error_kind: Some(kind.as_str().to_string()),
            message: message.into(),
        }
    }
}

/// Result envelope for a single lookup; absence is `note: None` with no error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGetResponse {
    pub note: Option<NoteListItem>,
    pub error_kind: Option<String>,
    pub message: String,
}

/// Full collection, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub items: Vec<NoteListItem>,
    pub message: String,
}

/// Creates a note; title and content are trimmed.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics.
/// - Returns created note id on success.
pub fn notes_create(title: String, content: String) -> NoteActionResponse {
    let draft = match NoteDraft::new(&title, &content) {
        Ok(draft) => draft,
        Err(err) => return NoteActionResponse::failure(err.kind(), err.to_string()),
    };
    match with_store(|store| store.insert(&draft)) {
        Ok(id) => NoteActionResponse::success("Note created.", id),
        Err(err) => action_failure("notes_create", &err),
    }
}

/// Replaces title and content of note `id`.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics; a missing note yields `error_kind = not_found`.
pub fn notes_update(id: i64, title: String, content: String) -> NoteActionResponse {
    let draft = match NoteDraft::new(&title, &content) {
        Ok(draft) => draft,
        Err(err) => return NoteActionResponse::failure(err.kind(), err.to_string()),
    };
    match with_store(|store| store.update(id, &draft)) {
        Ok(()) => NoteActionResponse::success("Note updated.", id),
        Err(err) => action_failure("notes_update", &err),
    }
}

/// Deletes note `id`.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics; a missing note yields `error_kind = not_found`.
pub fn notes_delete(id: i64) -> NoteActionResponse {
    match with_store(|store| store.delete(id)) {
        Ok(()) => NoteActionResponse::success("Note deleted.", id),
        Err(err) => action_failure("notes_delete", &err),
    }
}

/// Loads note `id`.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics.
pub fn notes_get(id: i64) -> NoteGetResponse {
    let formatter = DateFormatter::utc();
    match with_store(|store| store.get_by_id(id)) {
        Ok(Some(note)) => NoteGetResponse {
            note: Some(to_list_item(note, &formatter)),
            error_kind: None,
            message: "Note loaded.".to_string(),
        },
        Ok(None) => NoteGetResponse {
            note: None,
            error_kind: None,
            message: "Note not found.".to_string(),
        },
        Err(err) => NoteGetResponse {
            note: None,
            error_kind: Some(err.kind().as_str().to_string()),
            message: format!("notes_get failed: {err}"),
        },
    }
}

/// Lists every note, newest first.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics; failures return no items and an error message.
pub fn notes_list() -> NotesListResponse {
    let formatter = DateFormatter::utc();
    match with_store(|store| store.snapshot()) {
        Ok(snapshot) => {
            let items = snapshot
                .notes()
                .iter()
                .cloned()
                .map(|note| to_list_item(note, &formatter))
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesListResponse { items, message }
        }
        Err(err) => NotesListResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(f: impl FnOnce(&NoteStore) -> Result<T, StoreError>) -> Result<T, StoreError> {
    let store: Arc<NoteStore> = NoteStore::shared(resolve_db_path())?;
    f(&store)
}

fn action_failure(operation: &str, err: &StoreError) -> NoteActionResponse {
    if err.kind() == ErrorKind::StorageFault {
        warn!("event=ffi_call module=ffi status=error operation={operation} error={err}");
    }
    NoteActionResponse::failure(err.kind(), format!("{operation} failed: {err}"))
}

fn to_list_item(note: Note, formatter: &DateFormatter) -> NoteListItem {
    NoteListItem {
        formatted_date: formatter.format(note.created_date),
        id: note.id,
        title: note.title,
        content: note.content,
        created_date: note.created_date,
    }
}

//! Core persistence and observation logic for SimpleNotes.
//! This crate is the single source of truth for note invariants.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod view;
pub mod worker;

pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use store::{
    Clock, NoteStore, Snapshot, SnapshotSink, StoreError, StoreResult, Subscription,
    SubscriptionId, SystemClock,
};
pub use view::detail::{EditorError, EditorState, NoteEditorModel, NoteViewerModel, ViewerState};
pub use view::format::{DateFormatter, NoteRow};
pub use view::list::{confirm_delete, ListModelError, ListRenderer, ListState, NoteListModel};
pub use worker::{Dispatcher, MainQueue, StoreWorker, WorkerError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Single-note view models: viewer and editor.
//!
//! # Responsibility
//! - Load one note by id as a one-shot asynchronous read.
//! - Validate editor input before any write reaches the store.
//!
//! # Invariants
//! - A missing note (absence or `NotFound`) closes the screen.
//! - A blank title never reaches the store; it yields an inline message.
//! - Completions for a load the screen no longer waits for are ignored.

use crate::error::ErrorKind;
use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::store::{StoreError, StoreResult};
use crate::worker::{StoreWorker, WorkerError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inline message shown when the title is blank.
pub const EMPTY_TITLE_MESSAGE: &str = "Enter a title";
/// Inline message shown when a save did not complete.
pub const SAVE_FAILED_MESSAGE: &str = "Note was not saved";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Idle,
    Loading(NoteId),
    Showing(Note),
    Closed,
    Failed(ErrorKind),
}

/// Read-only note screen.
#[derive(Debug)]
pub struct NoteViewerModel {
    state: ViewerState,
}

impl NoteViewerModel {
    pub fn new() -> Self {
        Self {
            state: ViewerState::Idle,
        }
    }

    /// Starts (or restarts, e.g. after an edit) loading `id`.
    pub fn load_with<S: 'static>(
        &mut self,
        worker: &StoreWorker<S>,
        id: NoteId,
        project: fn(&mut S) -> &mut Self,
    ) -> Result<(), WorkerError> {
        worker.get_by_id(id, move |state: &mut S, result| {
            project(state).apply_loaded(id, result);
        })?;
        self.state = ViewerState::Loading(id);
        Ok(())
    }

    pub fn apply_loaded(&mut self, id: NoteId, result: StoreResult<Option<Note>>) {
        if self.state != ViewerState::Loading(id) {
            debug!("event=viewer_load module=view status=stale note_id={id}");
            return;
        }

        self.state = match result {
            Ok(Some(note)) => ViewerState::Showing(note),
            Ok(None) | Err(StoreError::NotFound(_)) => ViewerState::Closed,
            Err(err) => ViewerState::Failed(err.kind()),
        };
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn note(&self) -> Option<&Note> {
        match &self.state {
            ViewerState::Showing(note) => Some(note),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == ViewerState::Closed
    }
}

impl Default for NoteViewerModel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    Loading(NoteId),
    Saving,
    Saved(NoteId),
    Closed,
    LoadFailed(ErrorKind),
    SaveFailed(ErrorKind),
}

#[derive(Debug)]
pub enum EditorError {
    Validation(NoteValidationError),
    InvalidState(EditorState),
    Worker(WorkerError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidState(state) => write!(f, "cannot save note editor in state {state:?}"),
            Self::Worker(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Worker(err) => Some(err),
            Self::InvalidState(_) => None,
        }
    }
}

/// Create/edit note screen.
#[derive(Debug)]
pub struct NoteEditorModel {
    state: EditorState,
    existing: Option<Note>,
    title: String,
    content: String,
    inline_message: Option<&'static str>,
}

impl NoteEditorModel {
    /// Editor for a new, not yet persisted note.
    pub fn new_note() -> Self {
        Self {
            state: EditorState::Editing,
            existing: None,
            title: String::new(),
            content: String::new(),
            inline_message: None,
        }
    }

    /// Editor for an existing note; fields fill in once the read completes.
    pub fn edit_with<S: 'static>(
        worker: &StoreWorker<S>,
        id: NoteId,
        project: fn(&mut S) -> &mut Self,
    ) -> Result<Self, WorkerError> {
        worker.get_by_id(id, move |state: &mut S, result| {
            project(state).apply_loaded(id, result);
        })?;

        let mut editor = Self::new_note();
        editor.state = EditorState::Loading(id);
        Ok(editor)
    }

    pub fn apply_loaded(&mut self, id: NoteId, result: StoreResult<Option<Note>>) {
        if self.state != EditorState::Loading(id) {
            debug!("event=editor_load module=view status=stale note_id={id}");
            return;
        }

        match result {
            Ok(Some(note)) => {
                self.title = note.title.clone();
                self.content = note.content.clone();
                self.existing = Some(note);
                self.state = EditorState::Editing;
            }
            Ok(None) | Err(StoreError::NotFound(_)) => self.state = EditorState::Closed,
            Err(err) => self.state = EditorState::LoadFailed(err.kind()),
        }
    }

    /// Validates input and schedules `update` (existing note) or `insert`.
    ///
    /// Pass a `StoreWorker::serial_flow` worker when a later read on the same
    /// flow must observe this write.
    ///
    /// # Errors
    /// - `EditorError::Validation` for a blank title; the inline message is
    ///   set and nothing is scheduled.
    /// - `EditorError::InvalidState` unless the editor is editing (or
    ///   retrying after a failed save).
    pub fn save_with<S: 'static>(
        &mut self,
        worker: &StoreWorker<S>,
        title: &str,
        content: &str,
        project: fn(&mut S) -> &mut Self,
    ) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Editing | EditorState::SaveFailed(_)) {
            return Err(EditorError::InvalidState(self.state.clone()));
        }

        self.title = title.to_string();
        self.content = content.to_string();
        let draft = match NoteDraft::new(title, content) {
            Ok(draft) => draft,
            Err(err) => {
                self.inline_message = Some(EMPTY_TITLE_MESSAGE);
                return Err(EditorError::Validation(err));
            }
        };

        match &self.existing {
            Some(note) => {
                let id = note.id;
                worker.update(id, draft, move |state: &mut S, result| {
                    project(state).apply_saved(result.map(|()| id));
                })
            }
            None => worker.insert(draft, move |state: &mut S, result| {
                project(state).apply_saved(result);
            }),
        }
        .map_err(EditorError::Worker)?;

        self.inline_message = None;
        self.state = EditorState::Saving;
        Ok(())
    }

    pub fn apply_saved(&mut self, result: StoreResult<NoteId>) {
        if self.state != EditorState::Saving {
            return;
        }

        match result {
            Ok(id) => self.state = EditorState::Saved(id),
            Err(StoreError::NotFound(_)) => self.state = EditorState::Closed,
            Err(err) => {
                self.inline_message = Some(SAVE_FAILED_MESSAGE);
                self.state = EditorState::SaveFailed(err.kind());
            }
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn inline_message(&self) -> Option<&'static str> {
        self.inline_message
    }

    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }
}

//! Note record and draft.
//!
//! # Responsibility
//! - Define the canonical note shape shared by store, view models and FFI.
//! - Normalize and validate user input before it reaches the store.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and is never reused.
//! - `created_date` is set once at insert time and never mutated.
//! - `NoteDraft::title` is trimmed and non-empty.

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key.
///
/// Monotonically increasing in assignment order.
pub type NoteId = i64;

/// Persisted note as returned by store reads and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// May be empty.
    pub content: String,
    /// Unix epoch milliseconds captured at insert.
    pub created_date: i64,
}

/// Validation failure raised before a draft is handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl NoteValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailed
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Transient, pre-insert note content.
///
/// Drafts are the only write payload accepted by the store, so a value of
/// this type is proof that caller-side validation already ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Trims both fields and validates the title.
    ///
    /// # Errors
    /// - `NoteValidationError::EmptyTitle` when `title` is blank.
    pub fn new(
        title: impl AsRef<str>,
        content: impl AsRef<str>,
    ) -> Result<Self, NoteValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }

        Ok(Self {
            title: title.to_string(),
            content: content.as_ref().trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteDraft, NoteValidationError};
    use crate::error::ErrorKind;

    #[test]
    fn draft_trims_title_and_content() {
        let draft = NoteDraft::new("  Groceries \n", "\tMilk, eggs  ").unwrap();
        assert_eq!(draft.title(), "Groceries");
        assert_eq!(draft.content(), "Milk, eggs");
    }

    #[test]
    fn draft_rejects_blank_title() {
        let err = NoteDraft::new(" \t\n", "body").unwrap_err();
        assert_eq!(err, NoteValidationError::EmptyTitle);
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn draft_allows_empty_content() {
        let draft = NoteDraft::new("Todo", "").unwrap();
        assert!(draft.content().is_empty());
    }
}

//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted `Note` record and its transient `NoteDraft` form.
//! - Own the caller-side validation rules applied before a write.
//!
//! # Invariants
//! - A `Note` always carries a store-assigned `NoteId`.
//! - A `NoteDraft` never carries an id and always has a non-empty title.

pub mod note;

//! Flutter-facing bindings for the SimpleNotes core.

pub mod api;

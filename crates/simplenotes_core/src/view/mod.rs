//! Interactive-thread view models over the note store.
//!
//! # Responsibility
//! - Hold the latest store data a screen renders (list snapshot, one note).
//! - Turn user gestures into upward intents without touching the store.
//!
//! # Invariants
//! - View models live on the interactive thread and only change through
//!   completions drained from `crate::worker::MainQueue`.
//! - Store access always goes through `crate::worker::StoreWorker`.

pub mod detail;
pub mod format;
pub mod list;

/// Identity projection for screens whose whole state is one view model.
pub fn identity<T>(value: &mut T) -> &mut T {
    value
}

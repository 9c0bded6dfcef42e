//! Note list view model (adapter).
//!
//! # Responsibility
//! - Hold the most recently delivered "all notes" snapshot.
//! - Bind rows to display fields and report tap/long-press intents upward.
//!
//! # Invariants
//! - Each delivery replaces the whole list and signals one full re-bind;
//!   there is no incremental diffing.
//! - Lifecycle is `Idle -> Loading -> Populated (-> Populated)* ->
//!   Unsubscribed`; the subscription is released exactly once.
//! - The model never calls the store; delete goes through `confirm_delete`.

use crate::error::ErrorKind;
use crate::model::note::Note;
use crate::store::{Snapshot, StoreError, StoreResult, Subscription};
use crate::view::format::{DateFormatter, NoteRow};
use crate::view::identity;
use crate::worker::{StoreWorker, WorkerError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rendering collaborator for a note list.
pub trait ListRenderer {
    /// Every row may have changed; re-bind `item_count` rows.
    fn all_items_changed(&mut self, item_count: usize);
    /// Shows the empty-state indicator when `empty`, hides it otherwise.
    fn set_empty_state(&mut self, empty: bool);
}

/// Per-screen list lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Populated,
    Unsubscribed,
}

#[derive(Debug)]
pub enum ListModelError {
    InvalidTransition {
        from: ListState,
        action: &'static str,
    },
    Worker(WorkerError),
}

impl Display for ListModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} note list in state {from:?}")
            }
            Self::Worker(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Worker(err) => Some(err),
            Self::InvalidTransition { .. } => None,
        }
    }
}

type IntentHandler = Box<dyn FnMut(&Note)>;

/// View model backing one note list screen.
pub struct NoteListModel<R: ListRenderer> {
    state: ListState,
    snapshot: Option<Snapshot>,
    subscription: Option<Subscription>,
    last_error: Option<ErrorKind>,
    renderer: R,
    formatter: DateFormatter,
    on_activate: IntentHandler,
    on_secondary_activate: IntentHandler,
}

impl<R: ListRenderer + 'static> NoteListModel<R> {
    pub fn new(
        renderer: R,
        on_activate: impl FnMut(&Note) + 'static,
        on_secondary_activate: impl FnMut(&Note) + 'static,
    ) -> Self {
        Self {
            state: ListState::Idle,
            snapshot: None,
            subscription: None,
            last_error: None,
            renderer,
            formatter: DateFormatter::utc(),
            on_activate: Box::new(on_activate),
            on_secondary_activate: Box::new(on_secondary_activate),
        }
    }

    pub fn with_formatter(mut self, formatter: DateFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Subscribes through `worker` when the model is the whole screen state.
    pub fn start(&mut self, worker: &StoreWorker<Self>) -> Result<(), ListModelError> {
        self.start_with(worker, identity)
    }

    /// Subscribes through `worker`; `project` locates this model inside `S`.
    pub fn start_with<S: 'static>(
        &mut self,
        worker: &StoreWorker<S>,
        project: fn(&mut S) -> &mut Self,
    ) -> Result<(), ListModelError> {
        self.ensure_state(ListState::Idle, "start")?;

        let subscription = worker
            .subscribe_all(
                move |state: &mut S, snapshot| {
                    if let Err(err) = project(state).apply_snapshot(snapshot) {
                        warn!("event=list_apply module=view status=error error={err}");
                    }
                },
                move |state: &mut S, err: StoreError| project(state).record_failure(&err),
            )
            .map_err(ListModelError::Worker)?;

        self.attach(subscription)
    }

    /// Takes ownership of an existing subscription (`Idle -> Loading`).
    pub fn attach(&mut self, subscription: Subscription) -> Result<(), ListModelError> {
        self.ensure_state(ListState::Idle, "attach")?;
        debug!(
            "event=list_attach module=view status=ok subscription_id={}",
            subscription.id()
        );
        self.subscription = Some(subscription);
        self.state = ListState::Loading;
        Ok(())
    }

    /// Replaces the held snapshot and signals a full re-bind.
    ///
    /// Deliveries that were already queued when the list detached are
    /// dropped silently, as are snapshots older than the one held.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), ListModelError> {
        match self.state {
            ListState::Idle => {
                return Err(ListModelError::InvalidTransition {
                    from: ListState::Idle,
                    action: "apply snapshot to",
                })
            }
            ListState::Unsubscribed => return Ok(()),
            ListState::Loading | ListState::Populated => {}
        }

        if let Some(current) = &self.snapshot {
            if snapshot.revision() < current.revision() {
                return Ok(());
            }
        }

        let item_count = snapshot.len();
        let empty = snapshot.is_empty();
        self.snapshot = Some(snapshot);
        self.state = ListState::Populated;
        self.last_error = None;
        self.renderer.all_items_changed(item_count);
        self.renderer.set_empty_state(empty);
        Ok(())
    }

    /// Releases the subscription (`Loading|Populated -> Unsubscribed`).
    pub fn detach(&mut self) -> Result<(), ListModelError> {
        match self.state {
            ListState::Loading | ListState::Populated => {}
            from => {
                return Err(ListModelError::InvalidTransition {
                    from,
                    action: "detach",
                })
            }
        }

        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.state = ListState::Unsubscribed;
        Ok(())
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Kind of the last failed initial load, cleared by the next snapshot.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn item_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::len)
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn note_at(&self, position: usize) -> Option<&Note> {
        self.snapshot.as_ref()?.notes().get(position)
    }

    pub fn bind(&self, position: usize) -> Option<NoteRow> {
        self.note_at(position)
            .map(|note| NoteRow::bind(note, &self.formatter))
    }

    /// Forwards a tap on `position`; returns `false` for a stale position.
    pub fn activate(&mut self, position: usize) -> bool {
        let Some(note) = self.note_at(position).cloned() else {
            return false;
        };
        (self.on_activate)(&note);
        true
    }

    /// Forwards a long-press on `position`; returns `false` for a stale position.
    pub fn secondary_activate(&mut self, position: usize) -> bool {
        let Some(note) = self.note_at(position).cloned() else {
            return false;
        };
        (self.on_secondary_activate)(&note);
        true
    }

    fn record_failure(&mut self, err: &StoreError) {
        if self.state == ListState::Loading {
            self.last_error = Some(err.kind());
        }
    }

    fn ensure_state(&self, expected: ListState, action: &'static str) -> Result<(), ListModelError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ListModelError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }
}

/// Issues `delete` for `note` only when the confirmation dialog said yes.
///
/// Returns `Ok(false)` without scheduling anything when not confirmed.
pub fn confirm_delete<S: 'static>(
    worker: &StoreWorker<S>,
    note: &Note,
    confirmed: bool,
    done: impl FnOnce(&mut S, StoreResult<()>) + Send + 'static,
) -> Result<bool, WorkerError> {
    if !confirmed {
        debug!(
            "event=note_delete module=view status=cancelled note_id={}",
            note.id
        );
        return Ok(false);
    }

    worker.delete(note.id, done)?;
    Ok(true)
}

//! Worker execution context for store I/O.
//!
//! # Responsibility
//! - Keep every blocking store call off the interactive thread.
//! - Deliver each result (value, absence or failure) back onto the
//!   interactive thread through `MainQueue` before any UI state is touched.
//!
//! # Invariants
//! - Submission never blocks the caller on store I/O.
//! - Operations submitted on one `serial_flow()` worker complete, and post
//!   their completions, in submission order.
//! - In-flight operations are not cancellable; they always post a result.

mod executor;
mod main_queue;

pub use main_queue::{Dispatcher, MainQueue};

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::store::{NoteStore, Snapshot, SnapshotSink, StoreError, StoreResult, Subscription};
use executor::{Detached, Executor, SerialLane};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::Arc;

/// Failure to hand an operation to a worker thread.
#[derive(Debug)]
pub enum WorkerError {
    /// The OS refused to start a worker thread, or the lane has stopped.
    Spawn(io::Error),
}

impl Display for WorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to schedule store operation: {err}"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
        }
    }
}

type SnapshotHandler<S> = Arc<dyn Fn(&mut S, Snapshot) + Send + Sync>;

/// Bridges store fan-out onto the interactive thread.
struct DispatchSink<S> {
    dispatcher: Dispatcher<S>,
    on_snapshot: SnapshotHandler<S>,
}

impl<S: 'static> SnapshotSink for DispatchSink<S> {
    fn deliver(&self, snapshot: Snapshot) -> bool {
        let on_snapshot = Arc::clone(&self.on_snapshot);
        self.dispatcher
            .post(move |state: &mut S| on_snapshot(state, snapshot))
    }
}

/// Runs store operations on worker threads and posts results to `S`.
///
/// `S` is the interactive-thread state (a screen or view model) that
/// completions are applied to.
pub struct StoreWorker<S> {
    store: Arc<NoteStore>,
    dispatcher: Dispatcher<S>,
    executor: Arc<dyn Executor>,
}

impl<S: 'static> StoreWorker<S> {
    /// Creates a worker whose operations run unordered, one thread each.
    pub fn new(store: Arc<NoteStore>, dispatcher: Dispatcher<S>) -> Self {
        Self {
            store,
            dispatcher,
            executor: Arc::new(Detached),
        }
    }

    /// Returns a worker whose operations run one at a time in submission order.
    ///
    /// Use one per logical flow, e.g. "update then finish".
    pub fn serial_flow(&self) -> Result<Self, WorkerError> {
        let lane = SerialLane::start().map_err(WorkerError::Spawn)?;
        Ok(Self {
            store: Arc::clone(&self.store),
            dispatcher: self.dispatcher.clone(),
            executor: Arc::new(lane),
        })
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    /// Runs `op` off the interactive thread and posts `done` with its result.
    ///
    /// # Errors
    /// - `WorkerError::Spawn` when the operation could not be scheduled; in
    ///   that case neither `op` nor `done` runs.
    pub fn run<T, Op, Done>(&self, op: Op, done: Done) -> Result<(), WorkerError>
    where
        T: Send + 'static,
        Op: FnOnce(&NoteStore) -> T + Send + 'static,
        Done: FnOnce(&mut S, T) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let dispatcher = self.dispatcher.clone();
        self.executor
            .execute(Box::new(move || {
                let result = op(&store);
                dispatcher.post(move |state: &mut S| done(state, result));
            }))
            .map_err(|err| {
                warn!("event=worker_submit module=worker status=error error={err}");
                WorkerError::Spawn(err)
            })
    }

    pub fn insert(
        &self,
        draft: NoteDraft,
        done: impl FnOnce(&mut S, StoreResult<NoteId>) + Send + 'static,
    ) -> Result<(), WorkerError> {
        self.run(move |store| store.insert(&draft), done)
    }

    pub fn update(
        &self,
        id: NoteId,
        draft: NoteDraft,
        done: impl FnOnce(&mut S, StoreResult<()>) + Send + 'static,
    ) -> Result<(), WorkerError> {
        self.run(move |store| store.update(id, &draft), done)
    }

    pub fn delete(
        &self,
        id: NoteId,
        done: impl FnOnce(&mut S, StoreResult<()>) + Send + 'static,
    ) -> Result<(), WorkerError> {
        self.run(move |store| store.delete(id), done)
    }

    pub fn get_by_id(
        &self,
        id: NoteId,
        done: impl FnOnce(&mut S, StoreResult<Option<Note>>) + Send + 'static,
    ) -> Result<(), WorkerError> {
        self.run(move |store| store.get_by_id(id), done)
    }

    /// Subscribes to "all notes" with delivery on the interactive thread.
    ///
    /// Registration happens immediately and never blocks on I/O, so the
    /// caller owns the handle right away. The initial snapshot is read on a
    /// worker; if that read fails, `on_error` is posted instead and later
    /// writes still deliver.
    pub fn subscribe_all(
        &self,
        on_snapshot: impl Fn(&mut S, Snapshot) + Send + Sync + 'static,
        on_error: impl FnOnce(&mut S, StoreError) + Send + 'static,
    ) -> Result<Subscription, WorkerError> {
        let subscription = self.store.register(Arc::new(DispatchSink {
            dispatcher: self.dispatcher.clone(),
            on_snapshot: Arc::new(on_snapshot),
        }));

        let id = subscription.id();
        self.run(
            move |store| store.push_current(id),
            move |state, result| {
                if let Err(err) = result {
                    warn!(
                        "event=subscription_initial module=worker status=error subscription_id={id} error={err}"
                    );
                    on_error(state, err);
                }
            },
        )?;

        Ok(subscription)
    }
}

impl<S> Clone for StoreWorker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            dispatcher: self.dispatcher.clone(),
            executor: Arc::clone(&self.executor),
        }
    }
}

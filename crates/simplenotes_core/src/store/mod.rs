//! Shared note store with live "all notes" subscriptions.
//!
//! # Responsibility
//! - Own the durable note collection and expose CRUD over it.
//! - Push a fresh full snapshot to every live subscriber after each write.
//! - Provide the single process-wide instance on demand.
//!
//! # Invariants
//! - All connection access is serialized by one lock; writes are globally
//!   ordered and no reader observes a half-applied write.
//! - A write, its revision bump and the resulting fan-out happen under that
//!   same lock, so subscribers see snapshots in write order.
//! - Store operations block on I/O; interactive callers go through
//!   `crate::worker` instead of calling them directly.

mod clock;
mod subscription;

pub use clock::{Clock, SystemClock};
pub use subscription::{Snapshot, SnapshotSink, Subscription, SubscriptionId};

use crate::db::{open_db, open_db_in_memory};
use crate::error::ErrorKind;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError, SqliteNoteRepository};
use log::{debug, error, info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use subscription::SubscriberRegistry;

static SHARED_STORE: OnceCell<Arc<NoteStore>> = OnceCell::new();

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    /// Referenced note does not exist; the collection is unchanged.
    NotFound(NoteId),
    /// Underlying medium failed to open, read or write.
    Storage(RepoError),
    /// A thread panicked while holding the store lock.
    LockPoisoned,
    /// The shared store is already open at another location.
    SharedPathConflict {
        active: Option<PathBuf>,
        requested: PathBuf,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) | Self::LockPoisoned | Self::SharedPathConflict { .. } => {
                ErrorKind::StorageFault
            }
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "note store lock poisoned"),
            Self::SharedPathConflict { active, requested } => write!(
                f,
                "note store already open at `{}`; refusing to switch to `{}`",
                active
                    .as_deref()
                    .map_or_else(|| ":memory:".into(), Path::to_string_lossy),
                requested.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

struct StoreInner {
    conn: Connection,
    revision: u64,
}

/// Exclusive owner of the durable note collection.
///
/// `NoteStore` is `Send + Sync`; share it behind an `Arc`.
pub struct NoteStore {
    inner: Mutex<StoreInner>,
    subscribers: Arc<SubscriberRegistry>,
    clock: Arc<dyn Clock>,
    path: Option<PathBuf>,
}

impl NoteStore {
    /// Opens (or creates) a file-backed store.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the file cannot be opened or migrated.
    ///   Callers should treat this as fatal.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path).map_err(RepoError::from)?;
        let mut store = Self::from_connection(conn, Arc::new(SystemClock))?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Opens an empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(RepoError::from)?;
        Self::from_connection(conn, Arc::new(SystemClock))
    }

    /// Wraps an already migrated connection with an explicit clock.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the connection does not carry the notes
    ///   schema at the latest version.
    pub fn from_connection(conn: Connection, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        SqliteNoteRepository::try_new(&conn)?;
        Ok(Self {
            inner: Mutex::new(StoreInner { conn, revision: 0 }),
            subscribers: Arc::new(SubscriberRegistry::default()),
            clock,
            path: None,
        })
    }

    /// Returns the process-wide store, opening it at `path` on first access.
    ///
    /// Concurrent first calls open the database exactly once. A failed open
    /// leaves the slot empty so a later call may retry.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the first open fails.
    /// - `StoreError::SharedPathConflict` when already open at another path.
    pub fn shared(path: impl AsRef<Path>) -> StoreResult<Arc<Self>> {
        let requested = path.as_ref();
        let store = SHARED_STORE.get_or_try_init(|| {
            info!(
                "event=store_shared_init module=store status=start path={}",
                requested.display()
            );
            Self::open(requested).map(Arc::new)
        })?;

        if store.path() != Some(requested) {
            return Err(StoreError::SharedPathConflict {
                active: store.path.clone(),
                requested: requested.to_path_buf(),
            });
        }

        Ok(Arc::clone(store))
    }

    /// File location, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persists a new note and returns its assigned id.
    ///
    /// `createdDate` is read from the store clock under the write lock, so
    /// id order and `createdDate` order never disagree.
    pub fn insert(&self, draft: &NoteDraft) -> StoreResult<NoteId> {
        self.write("note_insert", |repo| {
            repo.insert_note(draft, self.clock.now_ms())
        })
    }

    /// Replaces title and content; `id` and `createdDate` are preserved.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no note has `id`.
    pub fn update(&self, id: NoteId, draft: &NoteDraft) -> StoreResult<()> {
        self.write("note_update", |repo| repo.update_note(id, draft))
    }

    /// Removes one note.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no note has `id`.
    pub fn delete(&self, id: NoteId) -> StoreResult<()> {
        self.write("note_delete", |repo| repo.delete_note(id))
    }

    /// One-shot lookup; absence is `Ok(None)`.
    pub fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let inner = self.lock_inner()?;
        let note = SqliteNoteRepository::new_unchecked(&inner.conn).get_note(id)?;
        Ok(note)
    }

    /// Reads the full ordered collection at the current revision.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        let inner = self.lock_inner()?;
        Self::read_snapshot(&inner).map_err(StoreError::from)
    }

    /// Registers `sink` and immediately pushes the current snapshot to it.
    ///
    /// The sink then receives a new snapshot after every completed write
    /// until the returned handle is released or dropped.
    pub fn subscribe_all(&self, sink: impl SnapshotSink + 'static) -> StoreResult<Subscription> {
        let inner = self.lock_inner()?;
        let subscription = self.subscribers.register(Arc::new(sink));
        let snapshot = Self::read_snapshot(&inner)?;
        self.subscribers.deliver_to(subscription.id(), snapshot);
        Ok(subscription)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Registers without touching the database.
    pub(crate) fn register(&self, sink: Arc<dyn SnapshotSink>) -> Subscription {
        self.subscribers.register(sink)
    }

    /// Pushes the current snapshot to one registered subscriber.
    pub(crate) fn push_current(&self, id: SubscriptionId) -> StoreResult<()> {
        let inner = self.lock_inner()?;
        let snapshot = Self::read_snapshot(&inner)?;
        self.subscribers.deliver_to(id, snapshot);
        Ok(())
    }

    fn write<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&SqliteNoteRepository<'_>) -> Result<T, RepoError>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut inner = self.lock_inner()?;

        let value = match op(&SqliteNoteRepository::new_unchecked(&inner.conn)) {
            Ok(value) => value,
            Err(RepoError::NotFound(id)) => {
                debug!("event={event} module=store status=not_found note_id={id}");
                return Err(StoreError::NotFound(id));
            }
            Err(err) => {
                error!(
                    "event={event} module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(StoreError::Storage(err));
            }
        };

        inner.revision += 1;
        let delivered = self.publish_locked(&inner);
        info!(
            "event={event} module=store status=ok revision={} subscribers={} duration_ms={}",
            inner.revision,
            delivered,
            started_at.elapsed().as_millis()
        );

        Ok(value)
    }

    fn publish_locked(&self, inner: &StoreInner) -> usize {
        if self.subscribers.is_empty() {
            return 0;
        }

        match Self::read_snapshot(inner) {
            Ok(snapshot) => self.subscribers.publish(&snapshot),
            Err(err) => {
                error!(
                    "event=snapshot_publish module=store status=error revision={} error={}",
                    inner.revision, err
                );
                0
            }
        }
    }

    fn read_snapshot(inner: &StoreInner) -> Result<Snapshot, RepoError> {
        let notes = SqliteNoteRepository::new_unchecked(&inner.conn).list_notes()?;
        Ok(Snapshot::new(inner.revision, notes))
    }

    fn lock_inner(&self) -> StoreResult<MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| {
            warn!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::LockPoisoned
        })
    }
}

impl std::fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore")
            .field("path", &self.path)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

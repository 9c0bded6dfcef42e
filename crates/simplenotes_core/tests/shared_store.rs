//! The process-wide store is a single slot, so every check lives in one
//! test to stay independent of test ordering.

use simplenotes_core::{NoteDraft, NoteStore, StoreError};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn shared_store_opens_once_and_rejects_other_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.sqlite3");

    let barrier = Arc::new(Barrier::new(6));
    let handles: Vec<_> = (0..6)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                barrier.wait();
                NoteStore::shared(&path).unwrap()
            })
        })
        .collect();

    let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for store in &stores[1..] {
        assert!(Arc::ptr_eq(&stores[0], store));
    }

    let id = stores[0]
        .insert(&NoteDraft::new("shared", "").unwrap())
        .unwrap();
    let again = NoteStore::shared(&path).unwrap();
    assert!(again.get_by_id(id).unwrap().is_some());

    let other = dir.path().join("other.sqlite3");
    match NoteStore::shared(&other) {
        Err(StoreError::SharedPathConflict { active, requested }) => {
            assert_eq!(active.as_deref(), Some(path.as_path()));
            assert_eq!(requested, other);
        }
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("expected path conflict"),
    }
}

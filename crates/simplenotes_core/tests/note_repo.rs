use simplenotes_core::db::{open_db_in_memory, SCHEMA_VERSION};
use simplenotes_core::{NoteDraft, NoteRepository, RepoError, SqliteNoteRepository};
use rusqlite::Connection;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let draft = NoteDraft::new("Groceries", "Milk, eggs").unwrap();
    let id = repo.insert_note(&draft, 1_000).unwrap();

    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Groceries");
    assert_eq!(loaded.content, "Milk, eggs");
    assert_eq!(loaded.created_date, 1_000);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    assert!(repo.get_note(42).unwrap().is_none());
}

#[test]
fn update_keeps_id_and_created_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let id = repo
        .insert_note(&NoteDraft::new("Todo", "Call Alice").unwrap(), 5_000)
        .unwrap();

    repo.update_note(id, &NoteDraft::new("Todo!", "Call Bob").unwrap())
        .unwrap();

    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Todo!");
    assert_eq!(loaded.content, "Call Bob");
    assert_eq!(loaded.created_date, 5_000);
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    repo.insert_note(&NoteDraft::new("keep", "").unwrap(), 1)
        .unwrap();

    let draft = NoteDraft::new("x", "").unwrap();
    assert!(matches!(
        repo.update_note(99, &draft),
        Err(RepoError::NotFound(99))
    ));
    assert!(matches!(repo.delete_note(99), Err(RepoError::NotFound(99))));
    assert_eq!(repo.count_notes().unwrap(), 1);
}

#[test]
fn list_orders_newest_first_and_breaks_ties_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let old = repo.insert_note(&NoteDraft::new("old", "").unwrap(), 100).unwrap();
    let tie_a = repo.insert_note(&NoteDraft::new("tie a", "").unwrap(), 200).unwrap();
    let tie_b = repo.insert_note(&NoteDraft::new("tie b", "").unwrap(), 200).unwrap();
    let newest = repo.insert_note(&NoteDraft::new("new", "").unwrap(), 300).unwrap();

    let ids: Vec<_> = repo.list_notes().unwrap().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![newest, tie_b, tie_a, old]);
}

#[test]
fn deleted_ids_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let first = repo.insert_note(&NoteDraft::new("a", "").unwrap(), 1).unwrap();
    let second = repo.insert_note(&NoteDraft::new("b", "").unwrap(), 2).unwrap();
    repo.delete_note(second).unwrap();
    let third = repo.insert_note(&NoteDraft::new("c", "").unwrap(), 3).unwrap();

    assert!(first < second);
    assert!(third > second);
}

#[test]
fn persisted_blank_title_is_returned_as_stored() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO notes (title, content, createdDate) VALUES ('   ', '', 1);",
        [],
    )
    .unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let notes = repo.list_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "   ");
}

#[test]
fn wrongly_typed_created_date_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO notes (title, content, createdDate) VALUES ('bad', '', 'yesterday');",
        [],
    )
    .unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    match repo.list_notes() {
        Err(RepoError::InvalidData(message)) => assert!(message.contains("createdDate")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteNoteRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
        .unwrap();

    assert!(matches!(
        SqliteNoteRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_created_date_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
        .unwrap();

    assert!(matches!(
        SqliteNoteRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "notes",
            column: "createdDate"
        })
    ));
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `simplenotes_core` wiring.
//! - Drive one create/update/delete round through the worker and list model
//!   against an in-memory store, printing each re-bind.

use simplenotes_core::{
    ListRenderer, MainQueue, NoteDraft, NoteListModel, NoteStore, StoreWorker,
};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

struct StdoutRenderer;

impl ListRenderer for StdoutRenderer {
    fn all_items_changed(&mut self, item_count: usize) {
        println!("list rebind items={item_count}");
    }

    fn set_empty_state(&mut self, empty: bool) {
        if empty {
            println!("list empty");
        }
    }
}

type Screen = NoteListModel<StdoutRenderer>;

fn main() -> Result<(), Box<dyn Error>> {
    println!("simplenotes_core version={}", simplenotes_core::core_version());

    let store = Arc::new(NoteStore::open_in_memory()?);
    let queue = MainQueue::<Screen>::new();
    let worker = StoreWorker::new(Arc::clone(&store), queue.dispatcher());
    let flow = worker.serial_flow()?;

    let mut list = NoteListModel::new(
        StdoutRenderer,
        |note| println!("open note id={}", note.id),
        |note| println!("confirm delete id={}", note.id),
    );
    list.start(&worker)?;
    settle(&queue, &mut list);

    flow.insert(NoteDraft::new("Groceries", "Milk, eggs")?, |_: &mut Screen, id| {
        println!("inserted {id:?}");
    })?;
    flow.insert(NoteDraft::new("Todo", "Call Alice")?, |_: &mut Screen, id| {
        println!("inserted {id:?}");
    })?;
    settle(&queue, &mut list);
    print_rows(&list);

    if let Some(first) = list.note_at(0).map(|note| note.id) {
        flow.update(first, NoteDraft::new("Todo", "Call Bob")?, |_: &mut Screen, result| {
            println!("updated {result:?}");
        })?;
    }
    if let Some(last) = list.note_at(list.item_count().saturating_sub(1)).cloned() {
        list.secondary_activate(list.item_count().saturating_sub(1));
        simplenotes_core::confirm_delete(&flow, &last, true, |_: &mut Screen, result| {
            println!("deleted {result:?}");
        })?;
    }
    settle(&queue, &mut list);
    print_rows(&list);

    list.activate(0);
    list.detach()?;
    println!(
        "list state={:?} subscribers={}",
        list.state(),
        store.subscriber_count()
    );
    Ok(())
}

/// Applies completions until the queue stays quiet for a moment.
fn settle(queue: &MainQueue<Screen>, list: &mut Screen) {
    if queue.wait_next(list, WAIT) {
        while queue.wait_next(list, Duration::from_millis(100)) {}
    }
}

fn print_rows(list: &Screen) {
    for position in 0..list.item_count() {
        if let Some(row) = list.bind(position) {
            println!(
                "  [{position}] {} | {} | {}",
                row.formatted_date, row.title, row.content
            );
        }
    }
}

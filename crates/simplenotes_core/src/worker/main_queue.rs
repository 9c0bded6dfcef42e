//! Interactive-thread completion queue.
//!
//! # Responsibility
//! - Carry completions from worker threads to the interactive thread.
//! - Apply them to interactive-thread state in arrival order.
//!
//! # Invariants
//! - Only the thread owning `MainQueue` ever touches `S`.
//! - Results travel by value inside the completion; nothing is shared for
//!   concurrent mutation.
//! - Posting after the queue is gone is a silent no-op.

use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

type Completion<S> = Box<dyn FnOnce(&mut S) + Send>;

/// Single-consumer queue drained by the interactive thread.
pub struct MainQueue<S> {
    tx: Sender<Completion<S>>,
    rx: Receiver<Completion<S>>,
}

impl<S> MainQueue<S> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Returns a posting handle for worker threads.
    pub fn dispatcher(&self) -> Dispatcher<S> {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Applies every pending completion without blocking.
    ///
    /// Returns the number of completions applied.
    pub fn drain(&self, state: &mut S) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(completion) => {
                    completion(state);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }

    /// Waits up to `timeout` for one completion and applies it.
    ///
    /// Returns `false` when nothing arrived in time.
    pub fn wait_next(&self, state: &mut S, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                completion(state);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

impl<S> Default for MainQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, `Send` handle that posts completions to a `MainQueue`.
pub struct Dispatcher<S> {
    tx: Sender<Completion<S>>,
}

impl<S> Dispatcher<S> {
    /// Queues `completion` for the interactive thread.
    ///
    /// Returns `false` when the queue no longer exists.
    pub fn post(&self, completion: impl FnOnce(&mut S) + Send + 'static) -> bool {
        if self.tx.send(Box::new(completion)).is_err() {
            debug!("event=main_queue_post module=worker status=dropped reason=queue_gone");
            return false;
        }
        true
    }
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

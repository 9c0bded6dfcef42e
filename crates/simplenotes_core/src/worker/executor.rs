//! Off-interactive-thread job executors.
//!
//! # Responsibility
//! - Run blocking store jobs on worker threads.
//! - Offer a serial lane for flows that need submission-order completion.
//!
//! # Invariants
//! - `Detached` starts one thread per job; jobs are unordered.
//! - `SerialLane` runs jobs one at a time in submission order and its thread
//!   exits once every handle to the lane is dropped.

use log::{debug, error};
use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

const WORKER_THREAD_NAME: &str = "simplenotes-worker";
const LANE_THREAD_NAME: &str = "simplenotes-lane";

pub(crate) type Job = Box<dyn FnOnce() + Send>;

/// Something that runs jobs off the calling thread.
pub(crate) trait Executor: Send + Sync {
    fn execute(&self, job: Job) -> io::Result<()>;
}

/// Unbounded pool: every job gets its own short-lived thread.
#[derive(Debug, Default)]
pub(crate) struct Detached;

impl Executor for Detached {
    fn execute(&self, job: Job) -> io::Result<()> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(job)
            .map(|_| ())
    }
}

/// One dedicated thread draining jobs in submission order.
pub(crate) struct SerialLane {
    tx: Mutex<Sender<Job>>,
}

impl SerialLane {
    pub(crate) fn start() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(LANE_THREAD_NAME.to_string())
            .spawn(move || {
                debug!("event=lane_start module=worker status=ok");
                for job in rx {
                    job();
                }
                debug!("event=lane_stop module=worker status=ok");
            })?;

        Ok(Self { tx: Mutex::new(tx) })
    }
}

impl Executor for SerialLane {
    fn execute(&self, job: Job) -> io::Result<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "serial lane lock poisoned"))?;
        tx.send(job).map_err(|_| {
            error!("event=lane_submit module=worker status=error error_code=lane_stopped");
            io::Error::new(io::ErrorKind::BrokenPipe, "serial lane thread stopped")
        })
    }
}

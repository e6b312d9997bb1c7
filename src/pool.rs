//! Fixed-size worker pool.
//!
//! The dispatcher pushes every task into a bounded queue sized to the whole
//! task list, closes it, and hands back an [`Outcomes`] iterator fed by a
//! completion channel. Workers take one task at a time from the queue, run
//! the transform to completion and report the outcome, so outcomes arrive
//! in completion order rather than submission order.
//!
//! Guarantees:
//! - every submitted task produces exactly one [`Outcome`], including tasks
//!   whose transform panics (reported as [`Outcome::Failure`])
//! - a failing task never stops the other workers
//! - all worker threads are joined before the iterator reports exhaustion

use crate::error::{CompressionError, Result};
use crate::task::{Outcome, Task};
use crossbeam::channel::{bounded, unbounded, Receiver};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// A pool of `worker_count` OS threads.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(CompressionError::InvalidWorkerCount(worker_count));
        }
        Ok(Self { worker_count })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Submits all `tasks` and returns the stream of their outcomes.
    ///
    /// At most `worker_count` threads are started, fewer when there are
    /// fewer tasks than workers. The only error is failing to spawn a
    /// thread; threads already started are stopped and joined in that case.
    pub fn run<F>(&self, tasks: Vec<Task>, transform: F) -> Result<Outcomes>
    where
        F: Fn(&Task) -> Outcome + Send + Sync + 'static,
    {
        let total = tasks.len();
        let worker_count = self.worker_count.min(total);

        let (task_tx, task_rx) = bounded::<Task>(total.max(1));
        let (outcome_tx, outcome_rx) = unbounded::<Outcome>();

        // The queue holds the whole list, so this never blocks.
        for task in tasks {
            if task_tx.send(task).is_err() {
                break;
            }
        }
        drop(task_tx);

        let mut outcomes = Outcomes {
            receiver: outcome_rx,
            workers: Vec::with_capacity(worker_count),
            stop: Arc::new(AtomicBool::new(false)),
            remaining: total,
        };

        info!("Dispatching {} tasks to {} workers", total, worker_count);

        let transform = Arc::new(transform);
        for id in 0..worker_count {
            let task_rx = task_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let transform = Arc::clone(&transform);
            let stop = Arc::clone(&outcomes.stop);

            let handle = thread::Builder::new()
                .name(format!("img-mirror-worker-{}", id))
                .spawn(move || {
                    debug!("Worker {} started", id);
                    let mut handled = 0usize;

                    while !stop.load(Ordering::Relaxed) {
                        let Ok(task) = task_rx.recv() else {
                            break;
                        };

                        let outcome = run_guarded(transform.as_ref(), &task);
                        handled += 1;
                        if outcome_tx.send(outcome).is_err() {
                            break;
                        }
                    }

                    debug!("Worker {} finished after {} tasks", id, handled);
                })?;

            outcomes.workers.push(handle);
        }

        Ok(outcomes)
    }
}

/// Runs the transform, turning a panic into a failure for this task only.
fn run_guarded<F>(transform: &F, task: &Task) -> Outcome
where
    F: Fn(&Task) -> Outcome,
{
    match panic::catch_unwind(AssertUnwindSafe(|| transform(task))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                "Worker panicked while processing {}: {}",
                task.input_path().display(),
                message
            );
            Outcome::failure(task.input_path(), format!("worker panicked: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Outcomes of a pool run, yielded as workers finish.
///
/// Finite: yields exactly one item per submitted task. Dropping it early
/// stops workers from taking further tasks and waits for them to exit.
pub struct Outcomes {
    receiver: Receiver<Outcome>,
    workers: Vec<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    remaining: usize,
}

impl Outcomes {
    /// Number of outcomes not yet received.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }
    }
}

impl Iterator for Outcomes {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        if self.remaining == 0 {
            self.join_workers();
            return None;
        }

        match self.receiver.recv() {
            Ok(outcome) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.join_workers();
                }
                Some(outcome)
            }
            Err(_) => {
                // Every sender is gone: only reachable if workers failed to
                // spawn or died outside the panic guard.
                error!("{} tasks never reported an outcome", self.remaining);
                self.remaining = 0;
                self.join_workers();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Outcomes {}

impl Drop for Outcomes {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.stop.store(true, Ordering::Relaxed);
        self.join_workers();
    }
}

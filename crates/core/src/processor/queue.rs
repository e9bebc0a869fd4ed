//! Work queue shared by the dispatcher and its workers.
//!
//! Jobs flow through an unbounded channel. Every pushed job increments an
//! outstanding counter and every [`QueueConsumer::task_done`] decrements it;
//! [`JobQueue::join`] waits for the counter to reach zero.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use super::types::TranscodeJob;

/// Producer side of the queue, owned by the dispatcher.
///
/// Dropping it closes the queue: consumers drain what is left and then see
/// `None` from [`QueueConsumer::next`].
#[derive(Debug)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<TranscodeJob>,
    outstanding: Arc<watch::Sender<usize>>,
}

/// Consumer side of the queue, cloned into every worker.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<TranscodeJob>>>,
    outstanding: Arc<watch::Sender<usize>>,
}

impl JobQueue {
    /// Creates an empty queue and its consumer handle.
    pub fn new() -> (Self, QueueConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0usize);
        let outstanding = Arc::new(outstanding);

        let queue = Self {
            tx,
            outstanding: Arc::clone(&outstanding),
        };
        let consumer = QueueConsumer {
            rx: Arc::new(Mutex::new(rx)),
            outstanding,
        };
        (queue, consumer)
    }

    /// Enqueues a job. Never blocks.
    pub fn push(&self, job: TranscodeJob) {
        self.outstanding.send_modify(|n| *n += 1);
        if self.tx.send(job).is_err() {
            // every consumer handle is gone, nobody will mark it done
            self.outstanding.send_modify(|n| *n -= 1);
        }
    }

    /// Jobs pushed but not yet marked done.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Waits until every pushed job has been marked done.
    pub async fn join(&self) {
        let mut rx = self.outstanding.subscribe();
        // the sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl QueueConsumer {
    /// Waits for the next job, or `None` once the queue is closed and empty.
    pub async fn next(&self) -> Option<TranscodeJob> {
        self.rx.lock().await.recv().await
    }

    /// Marks one job taken from [`next`](Self::next) as finished.
    pub fn task_done(&self) {
        self.outstanding.send_modify(|n| *n = n.saturating_sub(1));
    }
}

//! Background save queue.
//!
//! Saves are handed to a single worker thread and written in submission
//! order. Callers get a [`SaveTicket`] back immediately; nothing on the
//! submitting side ever waits for disk except [`SaveQueue::drain`] and
//! shutdown.
//!
//! A failed save is logged and counted; the previous data file stays on
//! disk and the caller is not told synchronously.

use apiary_core::{Error, Result, Snapshot};
use apiary_durability::DataStore;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Handle for one submitted save; tickets increase in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveTicket(u64);

impl SaveTicket {
    /// Submission sequence number, starting at 1
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Queue metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveQueueStats {
    /// Saves waiting for the worker.
    pub queue_depth: usize,
    /// Saves that reached disk.
    pub saves_completed: u64,
    /// Saves that failed and left the previous file in place.
    pub saves_failed: u64,
    /// Last save the worker finished, written or failed.
    pub last_completed: Option<SaveTicket>,
}

struct SaveJob {
    ticket: SaveTicket,
    snapshot: Snapshot,
}

struct QueueInner {
    store: Arc<DataStore>,
    queue: Mutex<VecDeque<SaveJob>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    sequence: AtomicU64,
    active: AtomicUsize,
    saves_completed: AtomicU64,
    saves_failed: AtomicU64,
    /// 0 until the first save finishes
    last_completed: AtomicU64,
}

/// FIFO save queue with one worker thread.
pub struct SaveQueue {
    inner: Arc<QueueInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SaveQueue {
    /// Start the worker thread, named `apiary-save`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn new(store: Arc<DataStore>) -> Result<Self> {
        let inner = Arc::new(QueueInner {
            store,
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            active: AtomicUsize::new(0),
            saves_completed: AtomicU64::new(0),
            saves_failed: AtomicU64::new(0),
            last_completed: AtomicU64::new(0),
        });

        let inner_clone = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name("apiary-save".to_string())
            .spawn(move || worker_loop(&inner_clone))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Queue a save of `snapshot`.
    ///
    /// Returns `Err(Error::QueueClosed)` once the queue has been shut down.
    pub fn submit(&self, snapshot: Snapshot) -> Result<SaveTicket> {
        let ticket = {
            let mut queue = self.inner.queue.lock();
            // Checked under the lock so a job can never land behind an
            // exiting worker
            if self.inner.shutdown.load(Ordering::Acquire) {
                return Err(Error::QueueClosed);
            }
            let ticket = SaveTicket(self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1);
            queue.push_back(SaveJob { ticket, snapshot });
            ticket
        };

        debug!(target: "apiary::queue", ticket = ticket.0, "Save queued");
        self.inner.work_ready.notify_one();
        Ok(ticket)
    }

    /// Block until all queued and in-flight saves have finished.
    ///
    /// The worker keeps running after drain completes.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while !queue.is_empty() || self.inner.active.load(Ordering::Acquire) > 0 {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Stop accepting saves, let the worker finish the queue, and join it.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        {
            let _queue = self.inner.queue.lock();
            self.inner.shutdown.store(true, Ordering::Release);
            self.inner.work_ready.notify_all();
        }

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!(target: "apiary::queue", "Save worker panicked");
            }
        }
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Return a snapshot of queue metrics.
    pub fn stats(&self) -> SaveQueueStats {
        let queue_depth = self.inner.queue.lock().len();
        let last = self.inner.last_completed.load(Ordering::Acquire);
        SaveQueueStats {
            queue_depth,
            saves_completed: self.inner.saves_completed.load(Ordering::Relaxed),
            saves_failed: self.inner.saves_failed.load(Ordering::Relaxed),
            last_completed: (last > 0).then_some(SaveTicket(last)),
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Clears `active` and wakes drain waiters, even if the save panicked.
struct ActiveJobGuard<'a> {
    inner: &'a QueueInner,
}

impl<'a> Drop for ActiveJobGuard<'a> {
    fn drop(&mut self) {
        self.inner.active.fetch_sub(1, Ordering::Release);
        let queue = self.inner.queue.lock();
        if queue.is_empty() {
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &QueueInner) {
    loop {
        let job = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(job) = queue.pop_front() {
                    inner.active.fetch_add(1, Ordering::Release);
                    break job;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveJobGuard { inner };
        let ticket = job.ticket.0;

        // Saved outside the queue lock so submitters never wait on disk
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            inner.store.save(&job.snapshot)
        }));
        match outcome {
            Ok(Ok(())) => {
                inner.saves_completed.fetch_add(1, Ordering::Relaxed);
                debug!(target: "apiary::queue", ticket, "Save completed");
            }
            Ok(Err(e)) => {
                inner.saves_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    target: "apiary::queue",
                    ticket,
                    path = %inner.store.path().display(),
                    error = %e,
                    "Save failed, previous data file kept"
                );
            }
            Err(panic) => {
                inner.saves_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    target: "apiary::queue",
                    ticket,
                    "Save panicked: {:?}",
                    panic
                        .downcast_ref::<&str>()
                        .copied()
                        .unwrap_or("(non-string panic)")
                );
            }
        }
        inner.last_completed.store(ticket, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_core::Hive;
    use tempfile::TempDir;

    fn queue_in(dir: &TempDir) -> (Arc<DataStore>, SaveQueue) {
        let store =
            Arc::new(DataStore::new(dir.path().join("DataFile.txt")).with_sync_on_save(false));
        let queue = SaveQueue::new(Arc::clone(&store)).unwrap();
        (store, queue)
    }

    fn snapshot_with_notes(notes: &str) -> Snapshot {
        let mut snapshot = Snapshot::new();
        let mut hive = Hive::new(1, 101, "Yellow", "Forest Location");
        hive.set_notes(notes);
        snapshot.add_hive(hive).unwrap();
        snapshot
    }

    #[test]
    fn test_submit_and_drain() {
        let dir = TempDir::new().unwrap();
        let (store, queue) = queue_in(&dir);

        let ticket = queue.submit(snapshot_with_notes("first")).unwrap();
        assert_eq!(ticket.sequence(), 1);
        queue.drain();

        let stats = queue.stats();
        assert_eq!(stats.queue_depth, 0);
        assert_eq!(stats.saves_completed, 1);
        assert_eq!(stats.saves_failed, 0);
        assert_eq!(stats.last_completed, Some(ticket));
        assert_eq!(store.load().unwrap().hive(1).unwrap().notes(), "first");
    }

    #[test]
    fn test_saves_run_in_submission_order() {
        let dir = TempDir::new().unwrap();
        let (store, queue) = queue_in(&dir);

        let tickets: Vec<SaveTicket> = (1..=25)
            .map(|i| queue.submit(snapshot_with_notes(&format!("save {}", i))).unwrap())
            .collect();
        assert!(tickets.windows(2).all(|w| w[0] < w[1]));

        queue.drain();
        assert_eq!(queue.stats().saves_completed, 25);
        assert_eq!(queue.stats().last_completed, tickets.last().copied());
        assert_eq!(store.load().unwrap().hive(1).unwrap().notes(), "save 25");
    }

    #[test]
    fn test_failed_save_is_counted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("DataFile.txt")).unwrap();
        let (_store, queue) = queue_in(&dir);

        let ticket = queue.submit(Snapshot::new()).unwrap();
        queue.drain();

        let stats = queue.stats();
        assert_eq!(stats.saves_completed, 0);
        assert_eq!(stats.saves_failed, 1);
        assert_eq!(stats.last_completed, Some(ticket));
    }

    #[test]
    fn test_submit_after_shutdown_rejected() {
        let dir = TempDir::new().unwrap();
        let (_store, queue) = queue_in(&dir);

        queue.shutdown();
        assert!(queue.is_closed());
        let err = queue.submit(Snapshot::new()).unwrap_err();
        assert!(matches!(err, Error::QueueClosed));
        // Second shutdown is a no-op
        queue.shutdown();
    }

    #[test]
    fn test_shutdown_runs_pending_saves() {
        let dir = TempDir::new().unwrap();
        let (store, queue) = queue_in(&dir);

        for i in 0..5 {
            queue.submit(snapshot_with_notes(&format!("n{}", i))).unwrap();
        }
        queue.shutdown();
        assert_eq!(queue.stats().saves_completed, 5);
        assert_eq!(store.load().unwrap().hive(1).unwrap().notes(), "n4");
    }

    #[test]
    fn test_drop_drains() {
        let dir = TempDir::new().unwrap();
        let (store, queue) = queue_in(&dir);
        queue.submit(snapshot_with_notes("on drop")).unwrap();
        drop(queue);
        assert_eq!(store.load().unwrap().hive(1).unwrap().notes(), "on drop");
    }
}

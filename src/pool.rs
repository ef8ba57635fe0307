//! Fixed-size worker pool for background cell loads.
//!
//! A classic bounded pool: N owned threads draining one unbounded FIFO.
//! Jobs are fire-and-forget; a caller that wants a completion signal
//! closes over its own primitive. Shutdown is terminal: the queue stops
//! accepting work, jobs that never started are discarded, and every
//! worker is joined before shutdown returns.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::error::SpatialError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads over an unbounded job queue.
pub struct WorkerPool {
  sender: Option<Sender<Job>>,
  workers: Vec<JoinHandle<()>>,
  shutdown: Arc<AtomicBool>,
  pending: Arc<AtomicUsize>,
}

impl WorkerPool {
  /// Spawn `workers` threads waiting on the queue.
  ///
  /// Fails if `workers` is zero.
  pub fn new(workers: usize) -> Result<Self, SpatialError> {
    if workers == 0 {
      return Err(SpatialError::InvalidWorkerCount);
    }
    let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
    let shutdown = Arc::new(AtomicBool::new(false));
    let pending = Arc::new(AtomicUsize::new(0));
    let workers = (0..workers)
      .map(|_| {
        let receiver = receiver.clone();
        let shutdown = Arc::clone(&shutdown);
        let pending = Arc::clone(&pending);
        std::thread::spawn(move || worker_loop(receiver, shutdown, pending))
      })
      .collect();
    Ok(Self {
      sender: Some(sender),
      workers,
      shutdown,
      pending,
    })
  }

  /// Spawn one worker per available CPU.
  ///
  /// Falls back to a single worker when parallelism cannot be
  /// determined.
  pub fn with_default_threads() -> Self {
    let workers = std::thread::available_parallelism()
      .map(|n| n.get())
      .unwrap_or(1);
    Self::new(workers).expect("worker count is at least 1")
  }

  /// Queue a job for execution on some worker.
  ///
  /// Fails once the pool is shut down.
  pub fn enqueue<F>(&self, job: F) -> Result<(), SpatialError>
  where
    F: FnOnce() + Send + 'static,
  {
    if self.shutdown.load(Ordering::Acquire) {
      return Err(SpatialError::PoolShutdown);
    }
    let Some(sender) = &self.sender else {
      return Err(SpatialError::PoolShutdown);
    };
    self.pending.fetch_add(1, Ordering::AcqRel);
    sender.send(Box::new(job)).map_err(|_| {
      self.pending.fetch_sub(1, Ordering::AcqRel);
      SpatialError::PoolShutdown
    })
  }

  /// Number of worker threads.
  pub fn worker_count(&self) -> usize {
    self.workers.len()
  }

  /// Jobs queued or currently running.
  pub fn pending_jobs(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }

  /// Stop accepting work, discard queued jobs, and join every worker.
  ///
  /// A job already running completes before this returns. Idempotent.
  pub fn shutdown(&mut self) {
    self.shutdown.store(true, Ordering::Release);
    // closing the channel wakes idle workers
    self.sender = None;
    for handle in self.workers.drain(..) {
      let _ = handle.join();
    }
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    self.shutdown();
  }
}

fn worker_loop(receiver: Receiver<Job>, shutdown: Arc<AtomicBool>, pending: Arc<AtomicUsize>) {
  while let Ok(job) = receiver.recv() {
    if shutdown.load(Ordering::Acquire) {
      // queued before shutdown, never ran
      pending.fetch_sub(1, Ordering::AcqRel);
      continue;
    }
    job();
    pending.fetch_sub(1, Ordering::AcqRel);
  }
}

// =============================================================================
// Tests
// =============================================================================

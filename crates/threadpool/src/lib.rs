//! # Threadpool
//!
//! A fixed-size worker pool that queues closures as tasks and hands back a
//! [`TaskHandle`] the caller can block on for the result — the mechanism
//! behind the engine's `put_task`/`get_task`/`del_task` async adapters.
//!
//! Mirrors the reference implementation's `ThreadPool`: a shared task queue
//! guarded by a mutex/condvar, N worker threads each looping
//! `wait-for-task -> pop -> run`, and an atomic shutdown flag so workers
//! drain the queue and exit cleanly instead of being killed mid-task.
//!
//! ## Example
//! ```rust
//! use threadpool::ThreadPool;
//!
//! let pool = ThreadPool::new(2);
//! let handle = pool.enqueue(|| 2 + 2);
//! assert_eq!(handle.join(), Some(4));
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Error raised when a task is enqueued after [`ThreadPool::shutdown`] (or
/// `Drop`) has begun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownInProgress;

impl std::fmt::Display for ShutdownInProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "thread pool has been shut down, cannot enqueue task")
    }
}

impl std::error::Error for ShutdownInProgress {}

/// A handle to a single enqueued task's eventual result.
///
/// Deliberately minimal — no cancellation, no polling interface — matching
/// the spec's "no intrinsic async is required" design note. [`join`] blocks
/// the calling thread until the worker finishes (or the pool is dropped
/// before running it, in which case it returns `None`).
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task completes, returning its result. Returns `None`
    /// if the pool was dropped (or the worker panicked) before the task ran.
    pub fn join(self) -> Option<T> {
        self.rx.recv().ok()
    }
}

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    cond: Condvar,
    stop: AtomicBool,
}

/// A fixed-size pool of worker threads consuming a shared task queue.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns `size` worker threads, each looping on the shared queue until
    /// [`shutdown`](ThreadPool::shutdown) or `Drop` sets the stop flag and
    /// the queue drains.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            stop: AtomicBool::new(false),
        });

        let workers = (0..size)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(&shared))
            })
            .collect();

        Self { shared, workers }
    }

    /// Enqueues `f` as a task and returns a [`TaskHandle`] for its result.
    ///
    /// # Panics
    ///
    /// Panics if the pool has already begun shutting down. Use
    /// [`try_enqueue`](ThreadPool::try_enqueue) to handle that case without
    /// panicking — matching the reference implementation, which raises the
    /// "pool closed" condition synchronously to the enqueuer.
    pub fn enqueue<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.try_enqueue(f).expect("thread pool has been shut down")
    }

    /// Enqueues `f` as a task, returning [`ShutdownInProgress`] instead of
    /// panicking if the pool is shutting down.
    pub fn try_enqueue<F, T>(&self, f: F) -> Result<TaskHandle<T>, ShutdownInProgress>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx): (Sender<T>, Receiver<T>) = mpsc::channel();
        let task: Task = Box::new(move || {
            let result = f();
            let _ = tx.send(result);
        });

        let mut queue = self.shared.queue.lock().unwrap();
        if self.shared.stop.load(Ordering::SeqCst) {
            return Err(ShutdownInProgress);
        }
        queue.push_back(task);
        drop(queue);
        self.shared.cond.notify_one();

        Ok(TaskHandle { rx })
    }

    /// Signals workers to stop taking new work once the queue drains, wakes
    /// them, and joins every worker thread. Idempotent-ish: calling twice is
    /// safe since `join` consumes the handles, leaving nothing to join the
    /// second time.
    pub fn shutdown(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.cond.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let mut queue = shared.queue.lock().unwrap();
        while queue.is_empty() && !shared.stop.load(Ordering::SeqCst) {
            queue = shared.cond.wait(queue).unwrap();
        }
        if shared.stop.load(Ordering::SeqCst) && queue.is_empty() {
            return;
        }
        let task = queue.pop_front();
        drop(queue);
        if let Some(task) = task {
            task();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Repeating background jobs.
//!
//! A poller runs its job on its own thread, once immediately and then every
//! interval, until it is stopped. [`Worker::stop`] blocks until the thread has
//! exited, so the caller may tear down whatever the job touches right after.
//!
//! Panels own their pollers and start or stop them from
//! [`Panel::set_active`](crate::manager::Panel::set_active), so a panel pushed
//! behind a modal stops polling until it is on top again.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::Result;

/// Something that can be started and stopped.
pub trait Worker {
    /// Start the worker. Starting a running worker does nothing.
    fn start(&mut self) -> Result<()>;

    /// Stop the worker and wait for it. Stopping a stopped worker does nothing.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

// =============================================================================
// RepeatingWorker
// =============================================================================

type Job = Arc<dyn Fn() + Send + Sync>;

struct Running {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs a job now and then every `interval` on a named thread.
pub struct RepeatingWorker {
    name: String,
    interval: Duration,
    job: Job,
    running: Option<Running>,
}

impl RepeatingWorker {
    pub fn new(interval: Duration, job: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: "cellpane-worker".to_string(),
            interval,
            job: Arc::new(job),
            running: None,
        }
    }

    /// Thread name, shown in logs and debuggers.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Worker for RepeatingWorker {
    fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let (stop, stopped) = mpsc::channel::<()>();
        let job = Arc::clone(&self.job);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                job();
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => job(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            })?;

        log::debug!("started {} (every {:?})", self.name, interval);
        self.running = Some(Running { stop, handle });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        // The thread may already be gone if the job panicked.
        let _ = running.stop.send(());
        if running.handle.join().is_err() {
            log::error!("{} panicked", self.name);
        }
        log::debug!("stopped {}", self.name);
    }

    #[inline]
    fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for RepeatingWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// WorkerList
// =============================================================================

/// A group of workers started and stopped together.
#[derive(Default)]
pub struct WorkerList {
    workers: Vec<Box<dyn Worker + Send>>,
}

impl WorkerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, worker: impl Worker + Send + 'static) {
        self.workers.push(Box::new(worker));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// True if any worker is running.
    pub fn is_running(&self) -> bool {
        self.workers.iter().any(|w| w.is_running())
    }

    /// Start every worker, stopping at the first failure.
    pub fn start(&mut self) -> Result<()> {
        for worker in &mut self.workers {
            worker.start()?;
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
    }
}

/// Stop `workers`, run `f`, then start them again.
pub fn with_suspended<R>(workers: &mut WorkerList, f: impl FnOnce() -> R) -> Result<R> {
    workers.stop();
    let result = f();
    workers.start()?;
    Ok(result)
}

// =============================================================================
// Tests
// =============================================================================

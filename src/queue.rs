//! Batch queue: one worker thread processes videos strictly one after another.
//!
//! The front end receives a [`JobEvent::Finished`] after each video and a
//! final [`JobEvent::AllDone`]. Cancellation takes effect between videos.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::driver::VideoReport;

/// A video waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    pub path: PathBuf,
}

impl VideoJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Progress notifications sent by the worker.
#[derive(Debug)]
pub enum JobEvent {
    Finished {
        /// 0-based position in the batch
        index: usize,
        total: usize,
        /// Share of the batch done, 0-100
        progress_percent: u8,
        path: PathBuf,
        outcome: Result<VideoReport>,
    },
    AllDone {
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    },
}

/// Processes a single video to completion.
pub trait VideoProcessor: Send + 'static {
    fn process(&mut self, job: &VideoJob) -> Result<VideoReport>;
}

impl<F> VideoProcessor for F
where
    F: FnMut(&VideoJob) -> Result<VideoReport> + Send + 'static,
{
    fn process(&mut self, job: &VideoJob) -> Result<VideoReport> {
        self(job)
    }
}

/// Handle to a running worker.
pub struct Worker {
    handle: JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

impl Worker {
    /// Skip every video that has not started yet.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Start a worker over `jobs`. Events arrive on the returned receiver.
pub fn spawn_worker<P: VideoProcessor>(jobs: Vec<VideoJob>, processor: P) -> (Worker, Receiver<JobEvent>) {
    let (sender, receiver) = channel();
    let cancel = Arc::new(AtomicBool::new(false));

    let worker_cancel = cancel.clone();
    let handle = thread::spawn(move || {
        run_worker(jobs, processor, &sender, &worker_cancel);
    });

    (Worker { handle, cancel }, receiver)
}

/// Worker loop. Blocks until every job is done or cancellation is seen.
pub fn run_worker<P: VideoProcessor>(
    jobs: Vec<VideoJob>,
    mut processor: P,
    events: &Sender<JobEvent>,
    cancel: &AtomicBool,
) {
    let total = jobs.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut cancelled = 0;

    for (index, job) in jobs.into_iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            cancelled = total - index;
            break;
        }

        let outcome = processor.process(&job);
        match &outcome {
            Ok(_) => succeeded += 1,
            Err(_) => failed += 1,
        }

        let event = JobEvent::Finished {
            index,
            total,
            progress_percent: (((index + 1) * 100) / total) as u8,
            path: job.path,
            outcome,
        };
        if events.send(event).is_err() {
            // Nobody is listening any more
            return;
        }
    }

    let _ = events.send(JobEvent::AllDone {
        succeeded,
        failed,
        cancelled,
    });
}

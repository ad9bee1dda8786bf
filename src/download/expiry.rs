//! Delayed deletion of produced files.
//!
//! Every successful download hands its job to the scheduler, which sleeps for
//! the retention window on a detached task and then removes the file. The
//! task outlives the request that armed it and never reports back.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::download::job::{DownloadJob, JobState};

/// Handle to an armed expiry timer.
///
/// The underlying task could be aborted in principle; the service never does.
#[derive(Debug)]
pub struct ExpiryHandle {
    task: JoinHandle<DownloadJob>,
}

impl ExpiryHandle {
    pub fn is_fired(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the timer to fire and get the job back in its final state.
    pub async fn fired(self) -> Option<DownloadJob> {
        self.task.await.ok()
    }
}

/// One-shot file expiry timers.
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    retention: Duration,
    armed: Arc<Mutex<HashSet<PathBuf>>>,
}

impl ExpiryScheduler {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            armed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Number of timers armed and not yet fired.
    pub fn armed_count(&self) -> usize {
        self.armed.lock().map(|set| set.len()).unwrap_or(0)
    }

    /// Take ownership of a completed job and delete its file after the
    /// retention window.
    ///
    /// Returns `None` (and arms nothing) if the job is not `Completed` or its
    /// path already has a timer.
    pub fn arm(&self, job: DownloadJob) -> Option<ExpiryHandle> {
        if job.state() != JobState::Completed {
            log::warn!("Refusing to arm expiry for job {} in state {}", job.id(), job.state());
            return None;
        }

        let path = job.output_path().to_path_buf();
        {
            let Ok(mut armed) = self.armed.lock() else {
                log::error!("Expiry registry poisoned; {} will not expire", path.display());
                return None;
            };
            if !armed.insert(path.clone()) {
                log::warn!("Expiry already armed for {}", path.display());
                return None;
            }
        }

        log::info!(
            "Armed expiry for {} (job {}) in {}s",
            path.display(),
            job.id(),
            self.retention.as_secs()
        );

        let retention = self.retention;
        let armed = Arc::clone(&self.armed);
        let task = tokio::spawn(async move {
            let mut job = job;
            tokio::time::sleep(retention).await;

            remove_expired_file(job.output_path()).await;
            job.expire();

            if let Ok(mut armed) = armed.lock() {
                armed.remove(job.output_path());
            }
            job
        });

        Some(ExpiryHandle { task })
    }
}

/// Best-effort delete. A file that is already gone is fine; any other
/// failure is logged and dropped.
async fn remove_expired_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::info!("Expired file removed: {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Expired file already gone: {}", path.display());
        }
        Err(e) => log::warn!("Failed to delete expired file {}: {}", path.display(), e),
    }
}

//! Download job lifecycle and output path allocation.

use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::config;
use crate::core::error::AppError;

/// Lifecycle of a single download.
///
/// `Pending → InProgress → Completed → Expired`, or `InProgress → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    InProgress,
    Completed,
    Expired,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Expired => write!(f, "expired"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One request's download, from format selection to file expiry.
#[derive(Debug)]
pub struct DownloadJob {
    id: Uuid,
    format_id: String,
    output_path: PathBuf,
    state: JobState,
}

impl DownloadJob {
    /// Create a pending job with a freshly allocated path under `output_dir`.
    pub fn new(output_dir: &Path, format_id: impl Into<String>) -> Result<Self, AppError> {
        let (id, output_path) = allocate_output_path(output_dir, config::download::MERGE_OUTPUT_FORMAT)?;
        Ok(Self {
            id,
            format_id: format_id.into(),
            output_path,
            state: JobState::Pending,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn format_id(&self) -> &str {
        &self.format_id
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// The extractor has been invoked.
    pub fn start(&mut self) {
        self.transition(JobState::Pending, JobState::InProgress);
    }

    /// The file exists on disk.
    pub fn complete(&mut self) {
        self.transition(JobState::InProgress, JobState::Completed);
    }

    /// The extractor failed; no file is guaranteed.
    pub fn fail(&mut self) {
        self.transition(JobState::InProgress, JobState::Failed);
    }

    /// The expiry scheduler removed the file.
    pub fn expire(&mut self) {
        self.transition(JobState::Completed, JobState::Expired);
    }

    fn transition(&mut self, from: JobState, to: JobState) {
        if self.state == from {
            log::debug!("Job {} {} → {}", self.id, from, to);
            self.state = to;
        } else {
            log::warn!("Job {} ignored transition to {} while {}", self.id, to, self.state);
        }
    }
}

/// Pick `<output_dir>/<uuid>.<ext>` that does not exist yet.
///
/// UUID v4 collisions are practically impossible, but a taken name is simply
/// skipped; after `MAX_PATH_ATTEMPTS` taken names allocation fails.
pub fn allocate_output_path(output_dir: &Path, ext: &str) -> Result<(Uuid, PathBuf), AppError> {
    for _ in 0..config::download::MAX_PATH_ATTEMPTS {
        let id = Uuid::new_v4();
        let path = output_dir.join(format!("{}.{}", id, ext));
        if !path.exists() {
            return Ok((id, path));
        }
        log::warn!("Generated path {} already exists, retrying", path.display());
    }

    Err(AppError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("could not allocate a unique file name in {}", output_dir.display()),
    )))
}

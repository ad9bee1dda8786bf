//! Metadata lookup and download execution on top of an `Extractor`.

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::{self, ServiceConfig};
use crate::core::error::{AppError, AppResult};
use crate::download::expiry::{ExpiryHandle, ExpiryScheduler};
use crate::download::job::DownloadJob;
use crate::download::metadata::MediaMetadata;
use crate::download::source::{Extractor, ProgressSender, StoreRequest};

/// A finished download whose file now belongs to the expiry scheduler.
#[derive(Debug)]
pub struct StoredFile {
    pub job_id: Uuid,
    pub path: PathBuf,
    /// `None` only if the path was somehow already armed
    pub expiry: Option<ExpiryHandle>,
}

/// Request handling core shared by the HTTP and WebSocket gateways.
pub struct DownloadService {
    extractor: Arc<dyn Extractor>,
    output_dir: PathBuf,
    scheduler: ExpiryScheduler,
}

fn require_url(url: &str) -> AppResult<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url must not be empty".to_string()));
    }
    Ok(url)
}

fn require_format_id(format_id: &str) -> AppResult<&str> {
    let format_id = format_id.trim();
    if format_id.is_empty() {
        return Err(AppError::Validation("format_id must not be empty".to_string()));
    }
    Ok(format_id)
}

impl DownloadService {
    pub fn new(extractor: Arc<dyn Extractor>, config: &ServiceConfig) -> Self {
        Self {
            extractor,
            output_dir: config.output_dir.clone(),
            scheduler: ExpiryScheduler::new(config.retention),
        }
    }

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Resolve metadata for `url` without downloading anything.
    pub async fn lookup_metadata(&self, url: &str) -> AppResult<MediaMetadata> {
        let url = require_url(url)?;
        log::info!("Metadata lookup via {}: {}", self.extractor.name(), url);

        let raw = self.extractor.fetch_metadata(url).await?;
        let metadata = MediaMetadata::from(raw);

        log::info!(
            "Metadata for {}: {:?}, {} downloadable formats",
            url,
            metadata.title,
            metadata.formats.len()
        );
        Ok(metadata)
    }

    /// Download `format_id` of `url` into a fresh file and arm its expiry.
    ///
    /// On failure the job ends `Failed`, nothing is armed, and any partial
    /// file is left where the extractor put it.
    pub async fn execute_download(
        &self,
        url: &str,
        format_id: &str,
        progress_tx: Option<ProgressSender>,
        cancel: CancellationToken,
    ) -> AppResult<StoredFile> {
        let url = require_url(url)?;
        let format_id = require_format_id(format_id)?;

        // Absorbed; an unusable directory surfaces as the extractor's own failure
        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            log::warn!("Failed to create output directory {}: {}", self.output_dir.display(), e);
        }

        let mut job = DownloadJob::new(&self.output_dir, format_id)?;
        let request = StoreRequest {
            url: url.to_string(),
            format_id: format_id.to_string(),
            destination: job.output_path().to_path_buf(),
            merge_format: config::download::MERGE_OUTPUT_FORMAT.to_string(),
        };

        log::info!(
            "Job {}: downloading {} format {} → {}",
            job.id(),
            url,
            format_id,
            request.destination.display()
        );
        job.start();

        if let Err(e) = self.extractor.fetch_and_store(&request, progress_tx, cancel).await {
            job.fail();
            log::warn!("Job {} failed: {}", job.id(), e);
            return Err(e);
        }

        job.complete();
        let job_id = job.id();
        let path = request.destination;
        let expiry = self.scheduler.arm(job);

        log::info!("Job {} completed: {}", job_id, path.display());
        Ok(StoredFile { job_id, path, expiry })
    }
}

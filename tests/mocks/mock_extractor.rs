//! Mock extractor for service and gateway tests
//!
//! Simulates metadata lookups and downloads without spawning yt-dlp: a
//! successful download writes a small file at the requested destination
//! and replays a scripted list of progress events.

#![allow(dead_code)]

use async_trait::async_trait;
use mediafetch::core::error::AppError;
use mediafetch::download::{Extractor, ProgressEvent, ProgressSender, RawFormat, RawMediaInfo, StoreRequest};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Bytes written for every successful mock download
pub const MOCK_FILE_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42mock";

/// How the mock behaves when asked to download
#[derive(Debug, Clone)]
pub enum DownloadBehavior {
    /// Emit the events, write the file, succeed
    Succeed(Vec<ProgressEvent>),
    /// Emit the events, optionally leave a partial file, fail with the message
    Fail {
        events: Vec<ProgressEvent>,
        message: String,
        leave_partial: bool,
    },
    /// Block until cancelled
    Hang,
}

/// Configuration for the mock extractor
#[derive(Debug, Clone)]
pub struct MockExtractorConfig {
    /// `Ok` info or the error text the engine "raises"
    pub metadata: Result<RawMediaInfo, String>,
    pub download: DownloadBehavior,
    /// Simulated latency before a download starts
    pub delay: Duration,
}

impl Default for MockExtractorConfig {
    fn default() -> Self {
        Self {
            metadata: Ok(sample_info()),
            download: DownloadBehavior::Succeed(vec![
                ProgressEvent::Downloading {
                    percent: "10.0%".to_string(),
                },
                ProgressEvent::Downloading {
                    percent: "55.5%".to_string(),
                },
                ProgressEvent::Finished,
            ]),
            delay: Duration::from_millis(5),
        }
    }
}

impl MockExtractorConfig {
    pub fn failing_metadata(message: &str) -> Self {
        Self {
            metadata: Err(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_download(message: &str, leave_partial: bool) -> Self {
        Self {
            download: DownloadBehavior::Fail {
                events: vec![ProgressEvent::Downloading {
                    percent: "3.0%".to_string(),
                }],
                message: message.to_string(),
                leave_partial,
            },
            ..Default::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            download: DownloadBehavior::Hang,
            ..Default::default()
        }
    }
}

/// A raw yt-dlp-like info document with a mix of usable and unusable formats
pub fn sample_info() -> RawMediaInfo {
    let format = |id: Option<&str>, res: Option<&str>, note: Option<&str>, url: bool| RawFormat {
        format_id: id.map(str::to_string),
        ext: Some("mp4".to_string()),
        resolution: res.map(str::to_string),
        filesize: Some(2048.0),
        format_note: note.map(str::to_string),
        url: url.then(|| "https://cdn.example.com/stream".to_string()),
    };

    RawMediaInfo {
        title: Some("Sample video".to_string()),
        thumbnail: Some("https://img.example.com/t.jpg".to_string()),
        duration: Some(212.0),
        uploader: Some("Uploader".to_string()),
        description: Some("Description".to_string()),
        formats: vec![
            format(Some("sb0"), None, Some("storyboard"), false),
            format(Some("140"), Some("audio only"), Some("medium"), true),
            format(Some("18"), Some("640x360"), Some("360p"), true),
            format(None, Some("1280x720"), None, true),
            format(Some("137"), None, Some("1080p"), true),
            format(Some("hls-1"), None, None, true),
        ],
    }
}

/// Mock extractor that records how often it was called
pub struct MockExtractor {
    config: MockExtractorConfig,
    metadata_calls: AtomicUsize,
    download_calls: AtomicUsize,
    cancelled_calls: AtomicUsize,
    destinations: Mutex<Vec<PathBuf>>,
}

impl MockExtractor {
    pub fn new(config: MockExtractorConfig) -> Self {
        Self {
            config,
            metadata_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            cancelled_calls: AtomicUsize::new(0),
            destinations: Mutex::new(Vec::new()),
        }
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    /// Hanging downloads released by their cancellation token
    pub fn cancelled_calls(&self) -> usize {
        self.cancelled_calls.load(Ordering::SeqCst)
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new(MockExtractorConfig::default())
    }
}

fn replay(events: &[ProgressEvent], progress_tx: Option<&ProgressSender>) {
    if let Some(tx) = progress_tx {
        for event in events {
            let _ = tx.send(event.clone());
        }
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_metadata(&self, _url: &str) -> Result<RawMediaInfo, AppError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.config.metadata.clone().map_err(AppError::Extraction)
    }

    async fn fetch_and_store(
        &self,
        request: &StoreRequest,
        progress_tx: Option<ProgressSender>,
        cancel: CancellationToken,
    ) -> Result<(), AppError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.destinations.lock().unwrap().push(request.destination.clone());
        tokio::time::sleep(self.config.delay).await;

        match &self.config.download {
            DownloadBehavior::Succeed(events) => {
                replay(events, progress_tx.as_ref());
                tokio::fs::write(&request.destination, MOCK_FILE_BYTES).await?;
                Ok(())
            }
            DownloadBehavior::Fail {
                events,
                message,
                leave_partial,
            } => {
                replay(events, progress_tx.as_ref());
                if *leave_partial {
                    tokio::fs::write(&request.destination, b"partial").await?;
                }
                Err(AppError::Extraction(message.clone()))
            }
            DownloadBehavior::Hang => {
                cancel.cancelled().await;
                self.cancelled_calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Extraction("Download cancelled".to_string()))
            }
        }
    }
}

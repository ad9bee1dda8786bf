//! Extractor abstraction layer.
//!
//! Provides the `Extractor` trait behind which the media-extraction engine
//! lives. The service only ever talks to this trait, so any engine (or a
//! test double) can be substituted.
//!
//! Built-in backend:
//! - `YtDlpExtractor` - 1000+ sites via the yt-dlp binary

pub mod ytdlp;

use crate::core::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Progress event emitted by an extractor while it downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A "downloading" tick with the engine's own percentage text (e.g. "42.3%")
    Downloading { percent: String },
    /// The engine reported a finished file
    Finished,
}

/// Sender half of the progress queue handed to `Extractor::fetch_and_store`.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// One format entry as reported by the engine, before any filtering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    /// Some extractors report sizes as floats, so keep the raw number
    pub filesize: Option<f64>,
    pub format_note: Option<String>,
    /// Direct source location; entries without one cannot be downloaded
    pub url: Option<String>,
}

/// Metadata as reported by the engine, before any filtering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// Parameters for a download-and-store operation.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    /// Media URL to download from
    pub url: String,
    /// Opaque format identifier chosen by the client
    pub format_id: String,
    /// Local path the merged file must end up at
    pub destination: PathBuf,
    /// Container the engine merges streams into (e.g., "mp4")
    pub merge_format: String,
}

/// Trait for media extraction engines.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of this engine (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Resolve metadata and available formats without downloading media bytes.
    async fn fetch_metadata(&self, url: &str) -> Result<RawMediaInfo, AppError>;

    /// Download `request.format_id` of `request.url` into `request.destination`.
    ///
    /// Progress events, when a sender is given, are pushed in the order the
    /// engine reports them. Cancelling `cancel` aborts the download.
    async fn fetch_and_store(
        &self,
        request: &StoreRequest,
        progress_tx: Option<ProgressSender>,
        cancel: CancellationToken,
    ) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_info_tolerates_missing_fields() {
        let info: RawMediaInfo = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(info.title.as_deref(), Some("t"));
        assert!(info.formats.is_empty());
        assert!(info.duration.is_none());
    }

    #[test]
    fn test_raw_info_ignores_unknown_fields() {
        let json = r#"{
            "id": "abc",
            "title": "Clip",
            "duration": 12.5,
            "formats": [{"format_id": "18", "ext": "mp4", "vcodec": "avc1", "url": "https://cdn/x"}]
        }"#;
        let info: RawMediaInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.duration, Some(12.5));
        assert_eq!(info.formats.len(), 1);
        assert_eq!(info.formats[0].format_id.as_deref(), Some("18"));
        assert_eq!(info.formats[0].url.as_deref(), Some("https://cdn/x"));
    }
}

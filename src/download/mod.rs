//! Download management: extractor backends, jobs, and file expiry

pub mod expiry;
pub mod job;
pub mod metadata;
pub mod progress;
pub mod service;
pub mod source;

// Re-exports for convenience
pub use expiry::{ExpiryHandle, ExpiryScheduler};
pub use job::{DownloadJob, JobState};
pub use metadata::{FormatDescriptor, MediaMetadata};
pub use service::{DownloadService, StoredFile};
pub use source::ytdlp::YtDlpExtractor;
pub use source::{Extractor, ProgressEvent, ProgressSender, RawFormat, RawMediaInfo, StoreRequest};

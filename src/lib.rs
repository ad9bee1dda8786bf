//! mediafetch - small service that lists media formats and downloads them
//!
//! A media URL goes to an external extractor (yt-dlp) for metadata, the
//! chosen format is downloaded to a uniquely named file, handed back to the
//! client, and deleted after a retention window.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging
//! - `download`: extractor backends, download jobs, file expiry
//! - `web`: HTTP endpoints and the WebSocket progress channel

pub mod cli;
pub mod core;
pub mod download;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, ServiceConfig};
pub use download::{DownloadService, Extractor, YtDlpExtractor};
pub use web::{create_router, start_web_server};

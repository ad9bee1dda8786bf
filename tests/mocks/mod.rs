//! Mock implementations for integration tests
//!
//! This module provides an in-process `Extractor` so tests never need the
//! yt-dlp binary or network access.

pub mod mock_extractor;

#[allow(unused_imports)]
pub use mock_extractor::{sample_info, DownloadBehavior, MockExtractor, MockExtractorConfig, MOCK_FILE_BYTES};

//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use mediafetch::core::ServiceConfig;
use mediafetch::download::DownloadService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use crate::mocks::{MockExtractor, MockExtractorConfig};

/// A service wired to a mock extractor and a scratch output directory
pub struct TestEnvironment {
    pub service: Arc<DownloadService>,
    pub extractor: Arc<MockExtractor>,
    /// Kept alive for the duration of the test
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new(config: MockExtractorConfig) -> Self {
        Self::with_retention(config, Duration::from_secs(600))
    }

    pub fn with_retention(config: MockExtractorConfig, retention: Duration) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let service_config = ServiceConfig::default()
            .with_output_dir(temp_dir.path().join("downloads"))
            .with_retention(retention);

        let extractor = Arc::new(MockExtractor::new(config));
        let service = Arc::new(DownloadService::new(extractor.clone(), &service_config));

        Self {
            service,
            extractor,
            temp_dir,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }

    /// Files currently present in the output directory
    pub fn output_files(&self) -> Vec<PathBuf> {
        list_files(&self.output_dir())
    }
}

pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

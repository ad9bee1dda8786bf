//! yt-dlp backed `Extractor`.
//!
//! Metadata comes from `--dump-json`; downloads run yt-dlp with `--newline`
//! so progress can be read line by line from stdout. Both calls run as async
//! child processes and never block runtime threads.

use crate::core::error::AppError;
use crate::download::progress::{extract_error_message, parse_progress};
use crate::download::source::{Extractor, ProgressSender, RawMediaInfo, StoreRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

/// Number of trailing stderr lines kept for error reporting
const STDERR_TAIL_LINES: usize = 200;

/// Extractor that shells out to yt-dlp.
pub struct YtDlpExtractor {
    ytdl_bin: String,
}

impl YtDlpExtractor {
    pub fn new(ytdl_bin: impl Into<String>) -> Self {
        Self {
            ytdl_bin: ytdl_bin.into(),
        }
    }

    /// Binary this extractor invokes
    pub fn binary(&self) -> &str {
        &self.ytdl_bin
    }

    /// Query `yt-dlp --version`. Returns `None` if the binary cannot be run.
    pub async fn version(&self) -> Option<String> {
        let output = TokioCommand::new(&self.ytdl_bin).arg("--version").output().await.ok()?;
        if !output.status.success() {
            return None;
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }

    /// Log the yt-dlp version at startup. A missing binary is only a warning:
    /// requests will fail with the spawn error until it is installed.
    pub async fn log_version(&self) {
        match self.version().await {
            Some(version) => log::info!("Using {} version {}", self.ytdl_bin, version),
            None => log::warn!(
                "⚠️  {} is not runnable; every extraction will fail until it is installed",
                self.ytdl_bin
            ),
        }
    }
}

/// Arguments for a metadata-only lookup.
fn build_metadata_args(url: &str) -> Vec<String> {
    vec![
        "--dump-json".to_string(),
        "--skip-download".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        url.to_string(),
    ]
}

/// Arguments for a download merged into `request.merge_format`.
fn build_download_args(request: &StoreRequest) -> Vec<String> {
    vec![
        "-o".to_string(),
        request.destination.to_string_lossy().into_owned(),
        "--format".to_string(),
        request.format_id.clone(),
        "--merge-output-format".to_string(),
        request.merge_format.clone(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--no-playlist".to_string(),
        request.url.clone(),
    ]
}

/// Parse `--dump-json` stdout. yt-dlp prints one JSON document per line;
/// with `--no-playlist` only the first one is relevant.
fn parse_metadata_json(stdout: &[u8]) -> Result<RawMediaInfo, AppError> {
    let text = String::from_utf8_lossy(stdout);
    let first = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::Extraction("yt-dlp returned no metadata".to_string()))?;

    serde_json::from_str(first).map_err(|e| AppError::Extraction(format!("Failed to parse yt-dlp output: {}", e)))
}

/// Drain a child's stderr, keeping only the last `STDERR_TAIL_LINES` lines.
async fn collect_stderr<R: AsyncRead + Unpin>(stream: Option<R>) -> String {
    let Some(stream) = stream else {
        return String::new();
    };

    let mut tail = VecDeque::<String>::new();
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log::debug!("yt-dlp stderr: {}", line);
        tail.push_back(line);
        if tail.len() > STDERR_TAIL_LINES {
            tail.pop_front();
        }
    }
    tail.make_contiguous().join("\n")
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_metadata(&self, url: &str) -> Result<RawMediaInfo, AppError> {
        let args = build_metadata_args(url);
        log::debug!("yt-dlp metadata command: {} {}", self.ytdl_bin, args.join(" "));

        let output = TokioCommand::new(&self.ytdl_bin)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to spawn yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = extract_error_message(&stderr, &output.status.to_string());
            log::warn!("yt-dlp metadata lookup failed for {}: {}", url, message);
            return Err(AppError::Extraction(message));
        }

        parse_metadata_json(&output.stdout)
    }

    async fn fetch_and_store(
        &self,
        request: &StoreRequest,
        progress_tx: Option<ProgressSender>,
        cancel: CancellationToken,
    ) -> Result<(), AppError> {
        let args = build_download_args(request);
        log::debug!("yt-dlp download command: {} {}", self.ytdl_bin, args.join(" "));

        let mut child = TokioCommand::new(&self.ytdl_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Extraction(format!("Failed to spawn yt-dlp: {}", e)))?;

        let stdout = child.stdout.take();
        let stderr_task = tokio::spawn(collect_stderr(child.stderr.take()));

        let relay = async {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::debug!("yt-dlp stdout: {}", line);
                    if let (Some(tx), Some(event)) = (progress_tx.as_ref(), parse_progress(&line)) {
                        // Receiver gone means nobody is listening any more; keep downloading
                        let _ = tx.send(event);
                    }
                }
            }
            child.wait().await
        };

        let status = tokio::select! {
            status = relay => Some(status),
            _ = cancel.cancelled() => None,
        };

        let status = match status {
            Some(status) => status?,
            None => {
                log::info!("Download of {} cancelled, killing yt-dlp", request.url);
                let _ = child.kill().await;
                return Err(AppError::Extraction("Download cancelled".to_string()));
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let message = extract_error_message(&stderr, &status.to_string());
            log::warn!("yt-dlp download failed for {}: {}", request.url, message);
            return Err(AppError::Extraction(message));
        }

        if !request.destination.exists() {
            return Err(AppError::Extraction(format!(
                "yt-dlp finished but produced no file at {}",
                request.destination.display()
            )));
        }

        Ok(())
    }
}

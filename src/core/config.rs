use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Output directory for produced media files
/// Read from DOWNLOAD_FOLDER environment variable
/// Default: downloads (relative to the working directory)
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// HTTP listen port
/// Read from SERVER_PORT environment variable
/// Default: 8000
pub static SERVER_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000)
});

/// Download configuration
pub mod download {
    use super::Duration;

    /// Delay before a produced file is deleted (in seconds)
    pub const FILE_CLEANUP_DELAY_SECS: u64 = 600; // 10 minutes

    /// Container every download is merged into
    pub const MERGE_OUTPUT_FORMAT: &str = "mp4";

    /// Filename announced to HTTP clients, independent of the on-disk name
    pub const CLIENT_FILENAME: &str = "video.mp4";

    /// Media type of the produced container
    pub const CLIENT_MEDIA_TYPE: &str = "video/mp4";

    /// How many fresh names to try before giving up on path generation
    pub const MAX_PATH_ATTEMPTS: usize = 8;

    /// File cleanup delay duration
    pub fn cleanup_delay() -> Duration {
        Duration::from_secs(FILE_CLEANUP_DELAY_SECS)
    }
}

/// Runtime settings of the download service.
///
/// Snapshot of the env-driven statics above, so the service and its tests
/// can be built with explicit values.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// yt-dlp binary to invoke
    pub ytdl_bin: String,
    /// Directory receiving `<uuid>.mp4` files
    pub output_dir: PathBuf,
    /// Retention window before a produced file is deleted
    pub retention: Duration,
}

impl ServiceConfig {
    /// Build the config from environment variables.
    pub fn from_env() -> Self {
        Self {
            ytdl_bin: YTDL_BIN.clone(),
            output_dir: PathBuf::from(shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).into_owned()),
            retention: download::cleanup_delay(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ytdl_bin: "yt-dlp".to_string(),
            output_dir: PathBuf::from("downloads"),
            retention: download::cleanup_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retention_is_ten_minutes() {
        assert_eq!(download::cleanup_delay(), Duration::from_secs(600));
        assert_eq!(ServiceConfig::default().retention, Duration::from_secs(600));
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = ServiceConfig::default()
            .with_output_dir("/tmp/out")
            .with_retention(Duration::from_millis(5));
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.retention, Duration::from_millis(5));
        assert_eq!(cfg.ytdl_bin, "yt-dlp");
    }
}

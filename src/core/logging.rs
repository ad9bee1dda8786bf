//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup configuration summary

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::ServiceConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the resolved service configuration at startup
pub fn log_startup_configuration(config: &ServiceConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Service configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("YTDL_BIN:        {}", config.ytdl_bin);
    log::info!("DOWNLOAD_FOLDER: {}", config.output_dir.display());
    log::info!("Retention:       {}s", config.retention.as_secs());

    if config.output_dir.exists() {
        log::info!("Output directory exists");
    } else {
        log::info!("Output directory will be created on first download");
    }
}

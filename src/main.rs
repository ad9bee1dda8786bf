use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use mediafetch::cli::{Cli, Commands};
use mediafetch::core::{config, init_logger, log_startup_configuration, ServiceConfig};
use mediafetch::download::{DownloadService, YtDlpExtractor};
use mediafetch::web::start_web_server;

/// Main entry point for the service
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, listener bind).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    let service_config = ServiceConfig::from_env();
    let extractor = Arc::new(YtDlpExtractor::new(service_config.ytdl_bin.clone()));

    match cli.command {
        Some(Commands::Run { port }) => run_server(port, service_config, extractor).await,
        Some(Commands::Info { url, json }) => run_cli_info(url, json, service_config, extractor).await,
        Some(Commands::CheckExtractor) => run_check_extractor(extractor).await,
        None => {
            log::info!("No command specified, running server in default mode");
            run_server(None, service_config, extractor).await
        }
    }
}

async fn run_server(port: Option<u16>, service_config: ServiceConfig, extractor: Arc<YtDlpExtractor>) -> Result<()> {
    log_startup_configuration(&service_config);
    extractor.log_version().await;

    let service = Arc::new(DownloadService::new(extractor, &service_config));
    let port = port.unwrap_or(*config::SERVER_PORT);

    start_web_server(port, service).await
}

async fn run_cli_info(
    url: String,
    json: bool,
    service_config: ServiceConfig,
    extractor: Arc<YtDlpExtractor>,
) -> Result<()> {
    let service = DownloadService::new(extractor, &service_config);
    let metadata = service.lookup_metadata(&url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("Title:    {}", metadata.title.as_deref().unwrap_or("-"));
    println!("Uploader: {}", metadata.uploader.as_deref().unwrap_or("-"));
    if let Some(duration) = metadata.duration {
        println!("Duration: {:.0}s", duration);
    }
    println!();
    println!("{:<12} {:<6} {:<16} {:>12}  NOTE", "FORMAT", "EXT", "RESOLUTION", "SIZE");
    for f in &metadata.formats {
        println!(
            "{:<12} {:<6} {:<16} {:>12}  {}",
            f.format_id,
            f.ext.as_deref().unwrap_or("-"),
            f.resolution,
            f.filesize.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            f.format_note.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn run_check_extractor(extractor: Arc<YtDlpExtractor>) -> Result<()> {
    match extractor.version().await {
        Some(version) => {
            println!("{} {}", extractor.binary(), version);
            Ok(())
        }
        None => Err(anyhow::anyhow!("{} is not runnable", extractor.binary())),
    }
}

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mediafetch")]
#[command(author, version, about = "Media metadata and download service backed by yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP/WebSocket server
    Run {
        /// Port to listen on (defaults to SERVER_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print metadata and formats for a URL, then exit
    Info {
        /// Media URL to inspect
        url: String,

        /// Print raw JSON instead of a format table
        #[arg(long)]
        json: bool,
    },

    /// Check that the yt-dlp binary is runnable and print its version
    CheckExtractor,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use confab::logging;
use confab::server::{ServerConfig, start_server};

#[derive(Parser)]
#[command(name = "confab")]
#[command(version, about = "Confab configuration service - mirrors AI-agent configuration bundles to GitHub")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(short, long, default_value_t = 8001)]
        port: u16,

        /// Path to the SQLite database file
        #[arg(long, default_value = ".confab/confab.db")]
        db_path: PathBuf,

        /// Bind all interfaces and allow permissive CORS (local frontend dev)
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port, db_path, dev } => {
            start_server(ServerConfig {
                port,
                db_path,
                dev_mode: dev,
            })
            .await
        }
    }
}

//! Beliefmap CLI
//!
//! Command-line tools for the beliefmap state server and local client stores.
//!
//! # Commands
//!
//! - `serve` - Run the state server
//! - `get` / `set` / `remove` - Operate on a local client store
//! - `sync` - Retry queued writes once
//! - `status` - Show connectivity and queued writes

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Beliefmap sync storage tools.
#[derive(Parser)]
#[command(name = "beliefmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the local client store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// State server URL (defaults to BELIEFMAP_SERVER_URL)
    #[arg(global = true, long)]
    server: Option<String>,

    /// API token (defaults to BELIEFMAP_TOKEN)
    #[arg(global = true, long)]
    token: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the state server
    Serve {
        /// Address to listen on (defaults to BIND_ADDR or 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Shared API secret (defaults to API_SECRET)
        #[arg(long)]
        secret: Option<String>,

        /// Directory for durable state (defaults to DATABASE_PATH, else in memory)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Read a value, refreshing it from the server if the server copy is newer
    Get {
        /// Key to read
        key: String,
    },

    /// Write a value locally and send it to the server
    Set {
        /// Key to write
        key: String,

        /// Serialized value
        value: String,
    },

    /// Remove a value locally and on the server
    Remove {
        /// Key to remove
        key: String,
    },

    /// Retry queued writes once
    Sync,

    /// Show connectivity and queued writes
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let remote = commands::RemoteArgs {
        server: cli.server,
        token: cli.token,
    };

    match cli.command {
        Commands::Serve {
            bind,
            secret,
            data_dir,
        } => {
            commands::serve::run(bind, secret, data_dir).await?;
        }
        Commands::Get { key } => {
            let path = cli.path.ok_or("Store path required for get")?;
            commands::item::get(&path, &remote, &key).await?;
        }
        Commands::Set { key, value } => {
            let path = cli.path.ok_or("Store path required for set")?;
            commands::item::set(&path, &remote, &key, &value).await?;
        }
        Commands::Remove { key } => {
            let path = cli.path.ok_or("Store path required for remove")?;
            commands::item::remove(&path, &remote, &key).await?;
        }
        Commands::Sync => {
            let path = cli.path.ok_or("Store path required for sync")?;
            commands::sync::run(&path, &remote).await?;
        }
        Commands::Status { format } => {
            let path = cli.path.ok_or("Store path required for status")?;
            commands::status::run(&path, &remote, &format).await?;
        }
        Commands::Version => {
            println!("Beliefmap CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

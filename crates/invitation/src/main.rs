//! invitation - wedding invitation server
//!
//! Subcommands:
//! - `invitation serve` - Run the HTTP server (default)
//! - `invitation config` - Show the effective configuration
//! - `invitation wishes` - Print the stored guestbook

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guestbook::{StoreConfig, WishStore};
use guestconf::InvitationConfig;
use invitation::{serve, telemetry};

#[derive(Parser)]
#[command(name = "invitation")]
#[command(about = "Wedding invitation site with a guestbook")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./invitation.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// HTTP port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding wishes.json
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory with the built site
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// OTLP gRPC endpoint for OpenTelemetry (e.g., "localhost:4317")
        #[arg(long)]
        otlp_endpoint: Option<String>,
    },

    /// Print the effective configuration and where it came from
    Config,

    /// Print the stored guestbook, newest first
    Wishes {
        /// Directory holding wishes.json
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = InvitationConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        data_dir: None,
        static_dir: None,
        otlp_endpoint: None,
    });

    match command {
        Commands::Serve {
            port,
            data_dir,
            static_dir,
            otlp_endpoint,
        } => {
            if let Some(port) = port {
                config.infra.bind.http_port = port;
            }
            if let Some(dir) = data_dir {
                config.infra.paths.data_dir = dir;
            }
            if let Some(dir) = static_dir {
                config.infra.paths.static_dir = dir;
            }
            if let Some(endpoint) = otlp_endpoint {
                config.infra.telemetry.otlp_endpoint = endpoint;
            }

            telemetry::init(&config.infra.telemetry)?;
            for file in &sources.files {
                tracing::debug!(file = %file.display(), "loaded config file");
            }
            serve::run(config).await?;
        }
        Commands::Config => {
            print!("{}", config.to_toml());
            println!();
            println!("# Sources:");
            if sources.files.is_empty() {
                println!("#   (no config files, using defaults)");
            }
            for file in &sources.files {
                println!("#   file: {}", file.display());
            }
            for var in &sources.env_overrides {
                println!("#   env:  {}", var);
            }
        }
        Commands::Wishes { data_dir } => {
            telemetry::init_fmt(&config.infra.telemetry);

            let data_dir = data_dir.unwrap_or(config.infra.paths.data_dir);
            let store = WishStore::new(StoreConfig::with_data_dir(data_dir));
            let wishes = store.list_all();

            if wishes.is_empty() {
                println!("(guestbook at {} is empty or unreadable)", store.path().display());
            }
            for wish in wishes {
                println!("[{}] {}: {}", wish.id, wish.name, wish.text);
            }
        }
    }

    Ok(())
}

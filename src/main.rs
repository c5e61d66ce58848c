mod config;
mod http_server;
mod logging;
mod ports;
mod providers;
mod resolver;
mod services;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    http_server::state::AppState,
    logging::init_tracing,
    providers::build_resolver,
    resolver::types::RequestCounter,
    services::http_client::ReqwestTransport,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SONGLIST_RESOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `songlist_resolver=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP collector endpoint for trace export
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a playlist link and print its songs
    Resolve {
        /// The playlist link (or share text containing one)
        link: String,

        /// Keep raw track titles instead of normalizing them
        #[arg(short, long)]
        detailed: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "8081", env = "SONGLIST_RESOLVER_PORT")]
        port: u16,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _tracing_guard = init_tracing(&args.log_level, args.otlp_endpoint.as_deref())?;

    tracing::debug!("Loading configuration");
    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load songlist-resolver config")?;

    match args.command {
        Commands::Resolve { link, detailed } => {
            let transport = Arc::new(ReqwestTransport::new(&config)?);
            let resolver = build_resolver(&config, transport);
            let counter = RequestCounter::new();

            let playlist = resolver
                .resolve(&counter, link.trim(), detailed)
                .await
                .wrap_err("Failed to resolve playlist")?;

            println!("{} ({} songs)", playlist.name, playlist.songs_count);
            for (index, song) in playlist.songs.iter().enumerate() {
                println!("{:>4}. {}", index + 1, song);
            }
        }
        Commands::Serve { port } => {
            let transport = Arc::new(ReqwestTransport::new(&config)?);
            let resolver = build_resolver(&config, transport);
            tracing::info!(batch_size = resolver.batch_size(), "Starting HTTP server");
            http_server::app::start(port, Arc::new(AppState::new(resolver))).await?;
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}

//! ENS Domain Lookup
//!
//! Serves the lookup page or resolves a single name or address from the
//! command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use enslookup_core::{render, resolve_once, LookupForm, View};
use enslookup_types::LookupMode;
use enslookup_web::text::render_text;
use enslookup_web::{start_server, AppState, Settings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "enslookup")]
#[command(about = "Look up ENS names and Ethereum addresses", long_about = None)]
#[command(version)]
struct Cli {
    /// Ethereum JSON-RPC endpoint URL
    #[arg(long, alias = "rpc", global = true)]
    rpc_url: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the lookup page and JSON API
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve one name or address and print the profile
    Lookup {
        /// `name` or `address`
        mode: LookupMode,
        /// ENS name or 0x-prefixed address
        value: String,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(rpc_url) = cli.rpc_url {
        settings.rpc_url = rpc_url;
    }
    init_logging(&settings)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lookup { mode, value, json } => lookup(&settings, mode, value, json).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let state = AppState::with_session_idle(settings.backend()?, settings.session_idle());
    info!("Starting ENS lookup v{}", env!("CARGO_PKG_VERSION"));
    info!("Resolving through {}", settings.rpc_url);
    start_server(state, &settings.listen_addr()).await
}

async fn lookup(settings: &Settings, mode: LookupMode, value: String, json: bool) -> Result<ExitCode> {
    let query = LookupForm::new(mode).with_input(value).submit();
    let snapshot = resolve_once(settings.backend()?, query).await;
    let view = render(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_text(&view));
    }

    Ok(match view {
        View::Error { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn init_logging(settings: &Settings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    // stdout carries lookup output
    if settings.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

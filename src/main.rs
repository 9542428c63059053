//! cobank-backend: the application entry point.
//!
//! Parses the CLI (flags with environment fallbacks), initializes structured
//! logging, then either runs the HTTP server or probes a running instance.

use clap::{Parser, Subcommand};

use cobank_backend::config::{LogFormat, ServiceConfig, DEFAULT_LOG_FILTER, DEFAULT_LOG_FORMAT};
use cobank_backend::{error, http, logging, probe, routes::create_router, state::AppState};

/// CoBank demo backend: health probes and service info over JSON
#[derive(Parser, Debug)]
#[command(name = "cobank-backend", version, about)]
struct Args {
    #[command(flatten)]
    config: ServiceConfig,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = DEFAULT_LOG_FORMAT)]
    log_format: LogFormat,

    /// Log level filter (e.g., "cobank_backend=debug")
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Probe a running instance's health endpoint once
    Check {
        /// Base URL of the instance (defaults to this host on the configured port)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    logging::init(args.log_format, &log_filter, &args.config.service_name);
    error::install_panic_hook();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::debug!(
                service = %args.config.service_name,
                version = %args.config.service_version,
                "Loaded configuration"
            );

            let state = AppState::new(args.config.clone());
            let app = create_router(state);

            http::start_server(app, &args.config).await?;
        }
        Command::Check { url } => {
            let base_url = url.unwrap_or_else(|| args.config.local_base_url());
            let client = probe::build_client()?;
            let status = probe::check_backend(&client, &base_url).await;

            println!("{status}");
            if !status.is_reachable() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

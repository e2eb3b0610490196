//! GA4 CLI - send Measurement Protocol events from the terminal.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use ga4_lib::{get_api_secret, parse_param, Client, Event};
use serde_json::Value;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ga4")]
#[command(about = "GA4 CLI - send Measurement Protocol events", long_about = None)]
struct Cli {
    /// GA4 measurement id (G-XXXXXXX).
    #[arg(long, env = "GA4_MEASUREMENT_ID", global = true)]
    measurement_id: Option<String>,

    /// Measurement Protocol API secret. When omitted, read from a secret backend.
    #[arg(long, env = "GA4_API_SECRET", hide_env_values = true, global = true)]
    api_secret: Option<String>,

    /// Stable user id. A UUIDv7 is generated when empty.
    #[arg(long, env = "GA4_USER_ID", default_value = "", global = true)]
    user_id: String,

    /// Use the validation endpoint and print the request and validation response.
    #[arg(
        long,
        env = "GA4_DEBUG",
        global = true,
        value_parser = FalseyValueParser::new()
    )]
    debug: bool,

    /// Base URL of the collection service.
    #[arg(long, env = "GA4_ENDPOINT", default_value = ga4_lib::client::DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Request timeout in seconds (at least 1).
    #[arg(long, default_value = "5", global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one event
    Send {
        /// Event name
        name: String,
        /// Event param as key=value (value parsed as JSON when possible); repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        println!("ga4 {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let measurement_id = cli
        .measurement_id
        .filter(|s| !s.trim().is_empty())
        .ok_or("measurement id not set. Pass --measurement-id or GA4_MEASUREMENT_ID.")?;
    let (api_secret, source) = get_api_secret(cli.api_secret.as_deref())?;
    tracing::debug!(?source, "resolved API secret");

    let client = Client::builder(measurement_id, api_secret)
        .user_id(cli.user_id)
        .debug(cli.debug)
        .endpoint(cli.endpoint)
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Send { name, params } => {
            let event = params
                .into_iter()
                .fold(Event::new(name), |e, (k, v)| e.with_param(k, v));
            client
                .submit_event(&event)
                .await
                .map_err(|e| e.to_string())?;
            if cli.debug {
                eprintln!("event sent as user {}", client.user_id());
            }
        }
        Commands::Version => {}
    }
    Ok(())
}

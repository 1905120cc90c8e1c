//! Omnify CLI
//!
//! Runs a single plain-language transfer instruction to completion and prints
//! the outcome as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin omnify -- --config config/omnify.toml send 2 apt to 0xabc on aptos testnet
//! ```
//!
//! Exit status is 0 when the transfer succeeded (or the instruction was a side
//! command) and 1 when it failed.

use anyhow::{Context, Result};
use clap::Parser;
use omnify::{
    config::{Config, ParserBackend},
    intent::{CompletionExtractor, IntentParser},
    orchestrator::{Execution, TransferOrchestrator},
    StatusMonitor, TransferServiceClient,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "omnify")]
#[command(about = "Execute a token transfer described in plain language")]
struct Args {
    /// Path to configuration file (default: config/omnify.toml or OMNIFY_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Intent parser backend (overrides parser.backend from the config file)
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Transfer instruction, e.g. "send 2 apt to 0xabc on aptos testnet"
    #[arg(required = true, trailing_var_arg = true)]
    instruction: Vec<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Pattern,
    Completion,
}

impl From<BackendArg> for ParserBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Pattern => ParserBackend::Pattern,
            BackendArg::Completion => ParserBackend::Completion,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first (before initializing logging)
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let mut config = Config::load_from_path(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(backend) = args.backend {
        config.parser.backend = backend.into();
        config.validate()?;
    }
    info!("Configuration loaded successfully");
    info!("Transfer service: {}", config.service.base_url);
    info!(
        "Polling: every {}ms, up to {} checks",
        config.monitor.polling_interval_ms, config.monitor.max_attempts
    );

    let parser = match config.parser.backend {
        ParserBackend::Pattern => IntentParser::pattern(),
        ParserBackend::Completion => {
            let completion = config
                .completion
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("completion backend selected but not configured"))?;
            let extractor = CompletionExtractor::from_config(completion)
                .context("Failed to initialize completion backend")?;
            IntentParser::new(Arc::new(extractor))
        }
    }
    .with_bypass_keywords(config.parser.bypass_keywords.clone());

    let contacts = config.contacts()?;
    info!("Loaded {} contacts", contacts.len());

    let client = Arc::new(
        TransferServiceClient::from_config(&config.service).context("Failed to create transfer service client")?,
    );
    let monitor = StatusMonitor::new(client.clone(), &config.monitor);
    let orchestrator = TransferOrchestrator::new(parser, Arc::new(contacts), client, monitor);

    let instruction = args.instruction.join(" ");
    match orchestrator.execute(&instruction).await {
        Execution::Transfer(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Execution::SideCommand(command) => {
            println!("{}", serde_json::to_string_pretty(&command)?);
        }
    }

    Ok(())
}

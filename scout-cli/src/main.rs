//! Shadow Scout CLI: terminal front end for the identity exposure audit.
//!
//! Runs a single audit per invocation and renders the outcome as text or
//! JSON.

mod commands;
mod render;
mod run;

use clap::{CommandFactory, Parser};
use scout_core::config::SearchBackendKind;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Shadow Scout: audit the public web footprint of a person and the
/// social-engineering risk it creates
#[derive(Parser, Debug)]
#[command(name = "shadow-scout", version, about, long_about = None)]
struct Cli {
    /// Name of the person to audit, optionally with a location or role
    target: Option<String>,

    /// Model identifier to try before the configured candidates
    #[arg(short, long)]
    model: Option<String>,

    /// Web-search backend: duckduckgo or google
    #[arg(short, long)]
    backend: Option<SearchBackendKind>,

    /// Maximum number of search results to analyze (1-25)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..=25))]
    max_results: Option<u16>,

    /// Always query the live backend, even for fixture trigger names
    #[arg(long)]
    no_fixtures: bool,

    /// Print the raw evidence records before the report
    #[arg(long)]
    show_evidence: bool,

    /// Print the run as a JSON document instead of text
    #[arg(long)]
    json: bool,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default workspace configuration file
    Init,
    /// Show effective configuration (secrets redacted)
    Show,
    /// Show configuration file locations
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet || cli.json => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "shadowscout", "shadow-scout")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "shadow-scout.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace);
    }

    let Some(target) = cli.target else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut config = scout_core::config::load_config(Some(&workspace))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Apply CLI overrides
    if let Some(model) = &cli.model {
        let model = model.trim().to_string();
        config.llm.models.retain(|m| *m != model);
        config.llm.models.insert(0, model);
    }
    if let Some(backend) = cli.backend {
        config.search.backend = backend;
    }
    if let Some(max) = cli.max_results {
        config.search.max_results = usize::from(max);
    }
    if cli.no_fixtures {
        config.search.fixtures = false;
    }

    let options = run::RunOptions {
        show_evidence: cli.show_evidence,
        json: cli.json,
        quiet: cli.quiet,
    };
    run::run_audit(&target, config, options).await
}

//! Wiki-Race main entry point
//!
//! This is the command-line interface for the Wiki-Race path finder.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiki_race::config::{load_config_with_hash, Config};
use wiki_race::session::{PollResult, RawSearchRequest, SessionRegistry};
use wiki_race::EventLog;

/// Wiki-Race: find a chain of links between two articles
///
/// By default Wiki-Race runs an HTTP server that accepts search requests
/// and streams search progress. With `--find` it runs one search in-process
/// and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "wiki-race")]
#[command(version)]
#[command(about = "Finds link paths between wiki articles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without serving
    #[arg(long, conflicts_with = "find")]
    dry_run: bool,

    /// Run a single search from START to FINISH and print the result
    #[arg(long, num_args = 2, value_names = ["START", "FINISH"])]
    find: Option<Vec<String>>,

    /// Search method for --find (breadth-first, bidirectional, best-first)
    #[arg(long, requires = "find", default_value = "breadth-first")]
    method: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(pages) = &cli.find {
        handle_find(&config, pages, &cli.method).await?;
    } else {
        wiki_race::server::serve(&config)
            .await
            .context("Server failed")?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_race=info,warn"),
            1 => EnvFilter::new("wiki_race=debug,info"),
            2 => EnvFilter::new("wiki_race=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Wiki-Race Dry Run ===\n");

    println!("Server:");
    println!("  Bind: {}", config.server.bind);
    match &config.server.static_dir {
        Some(dir) => println!("  Static files: {}", dir.display()),
        None => println!("  Static files: (none)"),
    }

    println!("\nUser Agent:");
    println!("  {}", wiki_race::fetcher::format_user_agent(&config.user_agent));

    println!("\nFetcher:");
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!("  Cache TTL: {}s", config.fetcher.cache_ttl_secs);
    println!("  Article pattern: {}", config.fetcher.article_pattern);
    match &config.fetcher.backlinks_api {
        Some(api) => println!("  Backlinks API: {}", api),
        None => println!("  Backlinks API: (disabled)"),
    }

    println!("\nSearch:");
    println!("  Max duration: {}s", config.search.max_duration_secs);
    println!("  Result retention: {}s", config.search.retention_secs);
    println!("  Log capacity: {}", config.search.log_capacity);

    println!("\n✓ Configuration is valid");
}

/// Handles the --find mode: runs one search and prints its result as JSON
async fn handle_find(config: &Config, pages: &[String], method: &str) -> Result<()> {
    let [start, finish] = pages else {
        anyhow::bail!("--find takes exactly two pages");
    };

    let registry = Arc::new(SessionRegistry::from_config(
        config,
        EventLog::new(config.search.log_capacity),
    )?);

    let request = RawSearchRequest {
        start: Some(start.clone()),
        finish: Some(finish.clone()),
        method: Some(method.to_string()),
    };
    let id = registry.submit(&request)?;
    tracing::info!("Search {} started", id);

    let mut interrupted = false;
    let (state, result) = loop {
        match registry.poll(&id) {
            PollResult::Ready { state, result } => break (state, result),
            PollResult::Pending(_) => {}
            PollResult::NotFound => anyhow::bail!("Search {} disappeared", id),
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted, aborting search");
                registry.abort(Some(&id));
                interrupted = true;
            }
        }
    };

    let mut output = serde_json::to_value(result.report())?;
    output["state"] = json!(state);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

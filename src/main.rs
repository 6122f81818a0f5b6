//! Zeno main entry point
//!
//! Command-line interface for the on-demand web catalog service.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeno::config::{load_config_with_hash, Config};
use zeno::supervisor::SearchProcess;

/// Zeno: an on-demand web catalog
///
/// Zeno fetches single web pages and PDFs on request, extracts their text,
/// stores them and feeds them to a supervised search engine.
#[derive(Parser, Debug)]
#[command(name = "zeno")]
#[command(version)]
#[command(about = "An on-demand web catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show how the search engine would be launched
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match zeno::server::run(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Service failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("zeno=info,warn"),
            1 => EnvFilter::new("zeno=debug,info"),
            2 => EnvFilter::new("zeno=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Zeno Dry Run ===\n");

    println!("Server:");
    println!("  Listen address: {}", config.server.listen_addr);
    match config.server.idle_timeout() {
        Some(timeout) => println!("  Idle timeout: {}s", timeout.as_secs()),
        None => println!("  Idle timeout: disabled"),
    }

    println!("\nFetching:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Accept invalid certs: {}", config.fetch.accept_invalid_certs);
    println!("  PDF converter: {}", config.fetch.pdftotext_path);
    println!("  Temp dir: {}", config.fetch.temp_dir().display());

    println!("\nStore:");
    println!("  Database: {}", config.store.database_path);

    println!("\nSearch engine:");
    println!("  URL: {}", config.search.base_url());
    println!("  Index: {}", config.search.index_name);
    println!(
        "  Mode: {}",
        if config.search.is_production() {
            "production"
        } else {
            "development"
        }
    );
    println!(
        "  Probe: every {}ms after {}s warm-up, {}ms timeout",
        config.search.probe_interval_ms, config.search.warmup_secs, config.search.probe_timeout_ms
    );
    println!(
        "  Command: {}",
        SearchProcess::from_config(&config.search).command_line()
    );

    println!("\n✓ Configuration is valid");
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taxtrap_cli::cli::{self, Cli};
use taxtrap_cli::config::AppConfig;

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set, then the config file's `log_level`.
/// * Falls back to `info`.
/// * Writes to stderr so stdout carries only the report.
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::from(log_level.unwrap_or("info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    init_tracing(config.log_level.as_deref());

    let output = cli::run(&cli, &config)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}

//! # Saorsa Stamp CLI
//!
//! Replays a stamp editor script and prints the resulting report as JSON.

use anyhow::Context;
use clap::Parser;
use stamp_cli::{replay, CliArgs, ReplayConfig, Script};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,stamp_core=debug,stamp_cli=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output. Logs go to stderr; stdout
/// carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stamp_core=debug,stamp_cli=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let pretty = args.pretty;
    let script_path = args.script.clone();
    let config = ReplayConfig::from(args);

    tracing::info!("Starting Saorsa Stamp v{}", stamp_core::VERSION);

    let script = Script::load(&script_path).await?;
    tracing::info!(
        "Loaded {} steps from {}",
        script.len(),
        script_path.display()
    );

    let report = replay(&config, &script).await?;

    let output = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;
    println!("{output}");

    if !report.failures.is_empty() {
        tracing::warn!("{} steps failed", report.failures.len());
    }
    Ok(())
}

//! # Khanh Hoa News
//!
//! Operator binary for the aggregation core: loads settings, builds the cached
//! aggregation service, asks it for the current news mapping and prints the
//! result as JSON.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=khanhhoa_news=debug khanhhoa_news --pretty
//! ```
//!
//! Logs go to stderr so stdout carries only JSON.

use clap::Parser;
use itertools::Itertools;
use khanhhoa_news::outputs::json;
use khanhhoa_news::{NewsMap, NewsService, Settings, SourceRegistry, build_service};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("khanhhoa_news starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, pretty = args.pretty, "Parsed CLI arguments");

    let settings = match &args.config {
        Some(path) => Settings::load(path).inspect_err(|e| error!(error = %e, "Invalid settings"))?,
        None => Settings::default(),
    };

    let service = build_service(&settings).inspect_err(|e| error!(error = %e, "Failed to build service"))?;

    if args.list_sources {
        print_sources(service.aggregator().registry());
        return Ok(());
    }

    match args.watch {
        None => {
            let news = service.current_news().await;
            emit(&news, &args).await?;
        }
        Some(secs) => watch(&service, &args, Duration::from_secs(secs.max(1))).await?,
    }

    service.aggregator().shutdown();
    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "khanhhoa_news finished");
    Ok(())
}

/// Ask for news on every tick until Ctrl-C. Ticks inside the freshness window
/// are served from cache without touching the network.
async fn watch(service: &NewsService, args: &Cli, every: Duration) -> Result<(), Box<dyn Error>> {
    let mut ticker = tokio::time::interval(every);
    info!(every_secs = every.as_secs(), "Watching; press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let news = service.current_news().await;
                if let Some(entry) = service.entry().await {
                    debug!(fetched_at = %entry.fetched_at_utc.to_rfc3339(), "Current cache entry");
                }
                emit(&news, args).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping watch");
                return Ok(());
            }
        }
    }
}

async fn emit(news: &NewsMap, args: &Cli) -> Result<(), Box<dyn Error>> {
    if news.is_empty() {
        info!("No news available");
    }
    match &args.output {
        Some(path) => json::write_news(news, path, args.pretty).await?,
        None => println!("{}", json::to_json(news, args.pretty)?),
    }
    Ok(())
}

fn print_sources(registry: &SourceRegistry) {
    for source in registry.iter() {
        println!(
            "{}\t{}\t{}",
            source.name(),
            source.strategy(),
            source.seeds().iter().map(|u| u.as_str()).join(" ")
        );
    }
}

//! Command-line interface definitions for the news aggregator binary.
//!
//! All options can be provided via command-line flags; the settings path can
//! also come from the environment.

use clap::Parser;
use std::path::PathBuf;

/// Fetch Khánh Hòa real-estate news and print it as JSON.
///
/// # Examples
///
/// ```sh
/// # One run with the built-in sources
/// khanhhoa_news --pretty
///
/// # Custom settings, written to a file, re-checked every 5 minutes
/// khanhhoa_news -c ./khnews.yaml -o ./out/news.json --watch 300
///
/// # Show the registry without fetching anything
/// khanhhoa_news --list-sources
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, env = "KHNEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Write the JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the source registry and exit
    #[arg(long)]
    pub list_sources: bool,

    /// Keep running and ask for news every SECS seconds (served from cache while fresh)
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

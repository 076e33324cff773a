use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use ghfeeds::batch::{self, BatchOptions};
use ghfeeds::config::Config;
use ghfeeds::reader::ReaderClient;

#[derive(Parser, Debug)]
#[command(
    name = "ghfeeds",
    version,
    about = "Subscribe to GitHub repository release feeds in an RSS reader"
)]
struct Args {
    /// Input file with GitHub repo URLs or names, one per line
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Feed category name in the reader
    #[arg(short, long, value_name = "NAME")]
    category: Option<String>,

    /// Delete all feeds within the category before subscribing
    #[arg(short = 'r', long)]
    clear_category_feeds: bool,

    /// Resolve identifiers and log intended actions without calling the reader
    #[arg(long)]
    dry_run: bool,

    /// Enable debug-level logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins when set; otherwise -d flips the default level to debug.
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config_path = Config::default_path();
    let Config { url, api_key } =
        Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    let client = ReaderClient::new(url, api_key);

    let options = BatchOptions {
        file: args.file,
        category: args.category,
        clear_category_feeds: args.clear_category_feeds,
        dry_run: args.dry_run,
    };

    let summary = batch::run(&client, &options)
        .await
        .context("Batch run failed")?;

    println!(
        "Subscribed to {} feeds ({} failed, {} deleted)",
        summary.subscribed, summary.failed, summary.deleted
    );
    Ok(())
}

//! Batch subscription runner.
//!
//! Reads newline-delimited repository identifiers from a file, derives each
//! release feed URL, and registers it with the reader. Malformed lines and
//! failed subscriptions are logged and skipped; a single bad line never
//! aborts the rest of the batch.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncBufReadExt;

use crate::github;
use crate::reader::{ReaderClient, ReaderError};

/// What a batch run should do.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Input file with one repository identifier per line.
    pub file: PathBuf,
    /// Reader category to subscribe under, if any.
    pub category: Option<String>,
    /// Delete the category's existing feeds before subscribing.
    pub clear_category_feeds: bool,
    /// Resolve and log without issuing subscribe/delete calls.
    pub dry_run: bool,
}

/// Outcome counts for a completed batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Feeds successfully subscribed (or would-be, in a dry run).
    pub subscribed: usize,
    /// Lines that failed normalization or subscription.
    pub failed: usize,
    /// Feeds deleted while clearing the category.
    pub deleted: usize,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    /// The input path resolves outside the current working directory.
    #[error("Input file path escapes the current working directory")]
    PathOutsideWorkingDir,

    #[error("Input path is not a regular file")]
    NotAFile,

    #[error("Clearing category feeds requires a category")]
    ClearWithoutCategory,

    /// A reader call that must succeed up-front (category resolution,
    /// feed listing) failed.
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Runs a batch subscription pass against the reader.
///
/// The category (if any) is resolved before anything else, so an unknown
/// name fails the run while it is still side-effect free. Per-line failures
/// afterwards are counted, logged, and skipped.
///
/// # Errors
///
/// Fails on an unreadable or out-of-tree input file, an unknown category, a
/// clear request without a category, or an error listing the feeds to clear.
pub async fn run(client: &ReaderClient, options: &BatchOptions) -> Result<BatchSummary, BatchError> {
    if options.clear_category_feeds && options.category.is_none() {
        return Err(BatchError::ClearWithoutCategory);
    }

    let category_id = match &options.category {
        Some(name) => client.category_id(name).await?,
        None => 0,
    };

    let mut summary = BatchSummary::default();

    if options.clear_category_feeds {
        summary.deleted = clear_category(client, category_id, options.dry_run).await?;
    }

    let file = tokio::fs::File::from_std(open_checked(&options.file)?);
    let mut lines = tokio::io::BufReader::new(file).lines();

    while let Some(line) = lines.next_line().await? {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let feed_url = match github::release_feed_url(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(identifier = %raw, error = %e, "skipping identifier");
                summary.failed += 1;
                continue;
            }
        };

        if options.dry_run {
            tracing::info!(feed = %feed_url, "dry run, would subscribe");
            summary.subscribed += 1;
            continue;
        }

        match client.subscribe(&feed_url, category_id).await {
            Ok(()) => summary.subscribed += 1,
            Err(e) => {
                tracing::error!(feed = %feed_url, error = %e, "subscription failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Deletes every feed in the category, counting successes. Individual
/// delete failures are logged and skipped.
async fn clear_category(
    client: &ReaderClient,
    category_id: i64,
    dry_run: bool,
) -> Result<usize, BatchError> {
    let feed_ids = client.category_feeds(category_id).await?;
    tracing::info!(category_id, feeds = feed_ids.len(), "clearing category feeds");

    let mut deleted = 0;
    for feed_id in feed_ids {
        if dry_run {
            tracing::info!(feed_id, "dry run, would delete feed");
            deleted += 1;
            continue;
        }
        match client.delete_feed(feed_id).await {
            Ok(()) => deleted += 1,
            Err(e) => tracing::error!(feed_id, error = %e, "failed to delete feed"),
        }
    }

    Ok(deleted)
}

/// Opens the input file after confirming it resolves to a regular file
/// under the current working directory (symlinks followed, `..` collapsed).
fn open_checked(path: &Path) -> Result<std::fs::File, BatchError> {
    let canonical = path.canonicalize()?;
    let cwd = std::env::current_dir()?.canonicalize()?;
    if !canonical.starts_with(&cwd) {
        return Err(BatchError::PathOutsideWorkingDir);
    }

    let metadata = std::fs::metadata(&canonical)?;
    if !metadata.is_file() {
        return Err(BatchError::NotAFile);
    }

    Ok(std::fs::File::open(&canonical)?)
}

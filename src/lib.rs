//! Subscribe to GitHub repository release feeds in a Miniflux-compatible
//! feed reader.
//!
//! The crate is organized around three pieces:
//!
//! - [`github`] - derives a repository's `releases.atom` feed URL from a raw
//!   identifier (full URL, `owner/name` shorthand, or GHCR image reference)
//! - [`reader`] - rate-limited client for the feed-reader HTTP API
//! - [`batch`] - reads identifiers from a file and registers each feed,
//!   continuing past malformed lines and failed subscriptions
//!
//! Connection settings (reader URL and API key) come from [`config`].

pub mod batch;
pub mod config;
pub mod github;
pub mod reader;

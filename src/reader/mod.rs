//! Client for a Miniflux-compatible feed-reader API.
//!
//! The module is organized into two submodules:
//!
//! - [`client`] - authenticated HTTP calls: category lookup, category feed
//!   listing, subscribe, delete
//! - [`rate_limit`] - token bucket throttling the mutating calls to one
//!   request per second with a burst of five
//!
//! The client owns its HTTP connection pool, credentials, and rate limiter;
//! construct one per target server rather than sharing process-wide state.

mod client;
mod rate_limit;

pub use client::{ReaderClient, ReaderError};
pub use rate_limit::RateLimiter;

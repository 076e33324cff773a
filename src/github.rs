use thiserror::Error;
use url::Url;

/// Errors produced while normalizing a repository identifier.
///
/// All variants are non-retryable and non-fatal: a batch caller is expected
/// to log the offending line and move on to the next one.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A `ghcr.io` image reference with fewer than three `/`-separated
    /// segments.
    #[error("invalid GHCR image reference")]
    InvalidGhcrRef,
    /// A `github.com` string that failed URL parsing, or whose host is not
    /// exactly `github.com`.
    #[error("invalid GitHub URL")]
    InvalidGithubUrl,
    /// An `owner/name` shorthand with a segment count other than two.
    #[error("invalid owner/name format")]
    InvalidShorthand,
    /// A bare word with no `/` at all.
    #[error("invalid repository identifier, expected owner/name format")]
    Unrecognized,
}

/// How a raw identifier was classified.
///
/// The checks run in this order and the first match wins; a string can
/// contain more than one marker substring (a GHCR reference also contains
/// `/`), so the ordering is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    /// Contains `ghcr.io`: a container image reference.
    ContainerImage,
    /// Contains `github.com`: a full repository URL.
    FullUrl,
    /// Contains `/`: an `owner/name` shorthand.
    Shorthand,
    /// None of the above.
    Bare,
}

fn classify(raw: &str) -> RefKind {
    if raw.contains("ghcr.io") {
        RefKind::ContainerImage
    } else if raw.contains("github.com") {
        RefKind::FullUrl
    } else if raw.contains('/') {
        RefKind::Shorthand
    } else {
        RefKind::Bare
    }
}

/// Derives the releases Atom feed URL for a GitHub repository identifier.
///
/// Accepts three shapes:
///
/// - full URL: `https://github.com/owner/name`
/// - shorthand: `owner/name`
/// - container image: `ghcr.io/owner/name` or `ghcr.io/owner/name:tag`
///
/// and returns `https://github.com/{owner}/{name}/releases.atom`. The owner
/// and name are inserted verbatim, without percent-encoding. For full URLs
/// the path is carried as-is, so extra segments beyond `owner/name` are
/// preserved rather than rejected.
///
/// # Errors
///
/// Returns a [`NormalizeError`] naming the rejected shape. The function is
/// pure and deterministic; it performs no I/O beyond a debug trace of the
/// resolved path.
pub fn release_feed_url(raw: &str) -> Result<String, NormalizeError> {
    let path = match classify(raw) {
        RefKind::ContainerImage => {
            let parts: Vec<&str> = raw.split('/').collect();
            if parts.len() < 3 {
                return Err(NormalizeError::InvalidGhcrRef);
            }
            // Drop any image tag (e.g. ":latest")
            let name = parts[2].split(':').next().unwrap_or(parts[2]);
            format!("{}/{}", parts[1], name)
        }
        RefKind::FullUrl => {
            let parsed = Url::parse(raw).map_err(|_| NormalizeError::InvalidGithubUrl)?;
            if parsed.host_str() != Some("github.com") {
                return Err(NormalizeError::InvalidGithubUrl);
            }
            parsed.path().trim_start_matches('/').to_string()
        }
        RefKind::Shorthand => {
            let parts: Vec<&str> = raw.split('/').collect();
            if parts.len() != 2 {
                return Err(NormalizeError::InvalidShorthand);
            }
            format!("{}/{}", parts[0], parts[1])
        }
        RefKind::Bare => return Err(NormalizeError::Unrecognized),
    };

    tracing::debug!(repo = %path, "resolved repository path");

    Ok(format!("https://github.com/{path}/releases.atom"))
}

//! Latest-release lookup for GitHub-hosted dependencies.
//!
//! GitHub answers `GET <repo>/releases/latest` with a redirect to
//! `<repo>/releases/tag/<tag>`. The request is sent with redirects disabled
//! and the tag is read from the `Location` header, so no API token or JSON
//! parsing is needed.
//!
//! Lookups are never cached. Each call asks GitHub again, so a release
//! published between two lookups in one run yields two different tags.

use anyhow::Result;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;

use crate::core::DepforgeError;

/// Release page URL answering with a redirect to the newest tag.
///
/// ```
/// use depforge::release::latest_release_url;
///
/// assert_eq!(
///     latest_release_url("https://github.com/VEuPathDB/FgpUtil.git"),
///     "https://github.com/VEuPathDB/FgpUtil/releases/latest"
/// );
/// ```
#[must_use]
pub fn latest_release_url(repo_url: &str) -> String {
    let trimmed = repo_url.trim_end_matches('/');
    let base = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    format!("{base}/releases/latest")
}

/// Whether `repo_url` points at github.com over HTTP(S).
#[must_use]
pub fn is_github_url(repo_url: &str) -> bool {
    ["https://github.com/", "http://github.com/"].iter().any(|p| repo_url.starts_with(p))
}

/// Extracts the tag from a `.../releases/tag/<tag>` redirect target.
///
/// Returns `None` for any other location, such as the plain `/releases`
/// page GitHub redirects to when a repository has no releases.
#[must_use]
pub fn tag_from_location(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location).trim_end_matches('/');
    let (before, tag) = path.rsplit_once('/')?;
    if !before.ends_with("/releases/tag") || tag.is_empty() {
        return None;
    }
    Some(tag.to_string())
}

/// Resolves the newest release tag of a GitHub repository.
///
/// # Errors
///
/// [`DepforgeError::ReleaseLookup`] if the URL is not a GitHub repository,
/// the request fails, or the response is not a redirect to a release tag.
pub async fn latest_release_tag(repo_url: &str) -> Result<String> {
    let url = latest_release_url(repo_url);
    let lookup_error = |reason: String| DepforgeError::ReleaseLookup {
        url: url.clone(),
        reason,
    };

    if !is_github_url(repo_url) {
        return Err(lookup_error(
            "\"latest\" can only be resolved for github.com repositories".to_string(),
        )
        .into());
    }

    tracing::debug!("Resolving latest release via {}", url);

    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .user_agent(concat!("depforge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| lookup_error(e.to_string()))?;

    let response = client.get(&url).send().await.map_err(|e| lookup_error(e.to_string()))?;
    let status = response.status();
    if !status.is_redirection() {
        return Err(lookup_error(format!("expected a redirect, got HTTP {status}")).into());
    }

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| lookup_error("redirect has no Location header".to_string()))?;

    let tag = tag_from_location(location)
        .ok_or_else(|| lookup_error(format!("no release tag in redirect to {location}")))?;

    tracing::info!("Latest release of {} is {}", repo_url, tag);
    Ok(tag)
}

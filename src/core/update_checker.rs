//! Release checking against obsync's distribution repository
//!
//! Fetches the latest published release tag and reduces it to a semantic
//! version string for comparison with the running binary.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SyncError};

/// GitHub repository where obsync releases are published
const RELEASE_REPO: &str = "stefanodecillis/obsync";

static VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+\.\d+\.\d+)").expect("invalid version pattern"));

/// Latest release information, as returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
}

/// Fetch the latest published release version.
///
/// Extracts a `MAJOR.MINOR.PATCH` prefix from the tag when present, falling
/// back to the raw tag with a leading `v` stripped.
pub async fn latest_release_version() -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(format!("obsync/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()?;

    let url = format!("https://api.github.com/repos/{RELEASE_REPO}/releases/latest");
    let response = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SyncError::GitHubApi(format!(
            "release lookup returned {}",
            response.status()
        )));
    }

    let release: ReleaseInfo = response.json().await?;
    Ok(extract_version(&release.tag_name))
}

fn extract_version(tag: &str) -> String {
    match VERSION_PREFIX.captures(tag) {
        Some(caps) => caps[1].to_string(),
        None => tag.trim_start_matches('v').to_string(),
    }
}

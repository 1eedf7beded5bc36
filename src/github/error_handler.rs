//! GitHub API error detection and classification
//!
//! Parses octocrab errors into the taxonomy so callers can distinguish an
//! expired token from a missing repository, with secrets redacted from the
//! fallback text.

use crate::core::security::sanitize_error_message;
use crate::error::SyncError;

/// Classifies an octocrab error into a more specific SyncError if possible
pub fn classify_github_error(err: octocrab::Error) -> SyncError {
    // Use the Debug format (Display only returns "GitHub")
    let error_message = format!("{:?}", err);

    if is_auth_error(&error_message) {
        return SyncError::AuthFailed(
            "GitHub rejected the stored token (401).".to_string(),
        );
    }

    if is_rate_limit_error(&error_message) {
        return SyncError::GitHubApi(
            "API rate limit exceeded. Please wait a few minutes and try again.".to_string(),
        );
    }

    if is_not_found_error(&error_message) {
        return SyncError::GitHubApi(
            "Repository not found. It may be private or you may not have access.".to_string(),
        );
    }

    SyncError::GitHubApi(sanitize_error_message(&error_message, None))
}

/// Check if error is an authentication failure
fn is_auth_error(error_message: &str) -> bool {
    error_message.contains("401")
        || error_message.contains("Bad credentials")
        || error_message.contains("Requires authentication")
}

/// Check if error is a rate limit error
fn is_rate_limit_error(error_message: &str) -> bool {
    error_message.contains("rate limit")
        || (error_message.contains("403") && error_message.contains("limit exceeded"))
}

/// Check if error is a 404 not found
fn is_not_found_error(error_message: &str) -> bool {
    error_message.contains("404") || error_message.contains("Not Found")
}

//! Custom error types for obsync
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the obsync application
#[derive(Error, Debug)]
pub enum SyncError {
    /// A validation predicate rejected user input
    #[error("{0}")]
    InvalidInput(String),

    /// No vault mapping has been stored yet
    #[error("Vault not configured.\n\n  → Run 'obsync init' to connect a vault to a repository.")]
    NotConfigured,

    /// The mapped vault path is not a git repository
    #[error("'{0}' is not a git repository.\n\n  → Run 'obsync init' to re-initialize the vault.")]
    NotGitRepository(String),

    /// No token stored and none provided
    #[error("You are not authenticated with GitHub.\n\n  → Run 'obsync auth login' or 'obsync init' to store a token.")]
    NotAuthenticated,

    /// Token rejected by GitHub
    #[error("GitHub authentication failed: {0}\n\n  → Your token may have expired. Run 'obsync auth login' with a fresh token.")]
    AuthFailed(String),

    /// Repository absent and creation disallowed
    #[error("Repository '{0}' not found and creation not allowed.\n\n  → Re-run 'obsync init' without --use-existing to create it.")]
    RepoNotFound(String),

    /// Push exhausted both strategies
    #[error("Push failed: {0}\n\n  → Your local commit is intact; fix the cause and run 'obsync push' again.")]
    PushFailed(String),

    /// Pull failed after the merge fallback
    #[error("Pull failed: {0}")]
    PullFailed(String),

    /// Local and remote histories cannot be reconciled automatically
    #[error("Merge conflict while pulling: {0}\n\n  → Resolve the conflict in the vault with git, then run 'obsync pull' again.")]
    MergeConflict(String),

    /// Credential storage cannot be secured
    #[error("Cannot secure credential storage: {0}")]
    Permission(String),

    /// GitHub API error
    #[error("GitHub API request failed: {0}\n\n  → Check your internet connection and token scopes.")]
    GitHubApi(String),

    /// Git operation error
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,

    /// Generic wrapper for underlying tooling failures
    #[error("{0}")]
    Runtime(String),
}

impl From<octocrab::Error> for SyncError {
    fn from(err: octocrab::Error) -> Self {
        // Use the error handler to classify and redact before display
        crate::github::error_handler::classify_github_error(err)
    }
}

/// Result type alias using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

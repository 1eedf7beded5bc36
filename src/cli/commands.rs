//! CLI command definitions using clap
//!
//! Defines the command structure for the `obsync` CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// obsync - vault to GitHub sync
///
/// Synchronize a local document vault with a private GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "obsync", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a vault and connect it to a private GitHub repository
    Init(InitArgs),

    /// Preview, commit and push all local changes
    Push(PushArgs),

    /// Pull and show the latest changes from GitHub
    Pull,

    /// Check whether a newer obsync release is available
    Update,

    /// Manage the stored GitHub token
    Auth(AuthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Init
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the local vault
    #[arg(long = "vault")]
    pub vault: Option<PathBuf>,

    /// GitHub repository name
    #[arg(long = "repo")]
    pub repo: Option<String>,

    /// Use an existing repository only, don't create a new one
    #[arg(long)]
    pub use_existing: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Push
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Store a Personal Access Token
    Login,
    /// Remove the stored token
    Logout,
    /// Show current authentication status
    Status,
}

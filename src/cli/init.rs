//! Init CLI command handler
//!
//! Connects a local vault to a private GitHub repository: resolves the
//! vault path, token and repository name (prompting for whatever was not
//! passed), provisions or adopts the remote repository, bootstraps the
//! local repository, and persists the mapping.

use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::cli::commands::InitArgs;
use crate::cli::prompt::{self, StdinConfirm};
use crate::core::security::{sanitize_url_for_display, validate_local_path, validate_repo_name};
use crate::core::{ConfigStore, VaultMapping, VaultRepo};
use crate::error::Result;
use crate::github::GitHubClient;

/// Handle the init command
pub async fn handle_init(args: InitArgs) -> Result<()> {
    let store = ConfigStore::open_default()?;
    let confirm = StdinConfirm;

    let vault = match args.vault {
        Some(path) => path,
        None => PathBuf::from(prompt::prompt_line("Enter the local path of your vault")?),
    };
    let vault = validate_local_path(&vault, &confirm)?;
    fs::create_dir_all(&vault)?;

    let token = match store.token()? {
        Some(token) => {
            println!("Using stored GitHub token");
            token
        }
        None => {
            let raw = prompt::prompt_secret("Enter your GitHub Personal Access Token")?;
            store.set_token(&raw)?;
            println!("Token stored in {}", store.secrets_path().display());
            SecretString::from(raw)
        }
    };

    let repo_name = match args.repo {
        Some(name) => name,
        None => {
            let default = vault
                .file_name()
                .map(|n| n.to_string_lossy().replace(' ', "-"))
                .unwrap_or_else(|| "vault".to_string());
            prompt::prompt_line_with_default("Enter the GitHub repository name", &default)?
        }
    };
    let repo_name = validate_repo_name(&repo_name)?;

    println!(
        "{} repository: {repo_name}",
        if args.use_existing { "Checking" } else { "Using" }
    );

    let client = GitHubClient::new(token)?;
    let full_name = client.ensure_repo(&repo_name, !args.use_existing).await?;
    let remote_url = client.remote_url(&full_name);

    VaultRepo::init(&vault, &remote_url, &confirm)?;

    store.set_mapping(&VaultMapping {
        vault_path: vault.clone(),
        repo_full_name: full_name.clone(),
        remote_url: sanitize_url_for_display(&remote_url),
    })?;

    let action = if args.use_existing {
        "connected to"
    } else {
        "initialized at"
    };
    println!("✓ Vault {action} {} → {full_name}", vault.display());
    Ok(())
}

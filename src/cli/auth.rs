//! Authentication CLI command handlers

use crate::cli::commands::AuthCommand;
use crate::cli::prompt;
use crate::core::ConfigStore;
use crate::error::Result;
use crate::github::GitHubClient;

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login => handle_login().await,
        AuthCommand::Logout => handle_logout(),
        AuthCommand::Status => handle_status(),
    }
}

/// Store a Personal Access Token after verifying it against the API
async fn handle_login() -> Result<()> {
    println!("To create a token:");
    println!("  1. Go to: https://github.com/settings/tokens/new");
    println!("  2. Give it a name (e.g., 'obsync')");
    println!("  3. Select the 'repo' scope");
    println!("  4. Click 'Generate token' and copy it");
    println!();

    let raw = prompt::prompt_secret("Paste your token here")?;

    let store = ConfigStore::open_default()?;
    // Shape check happens inside set_token; verify against the API before
    // reporting success
    store.set_token(&raw)?;

    println!();
    println!("Validating token...");
    let client = GitHubClient::new(secrecy::SecretString::from(raw))?;
    match client.authenticated_login().await {
        Ok(login) => {
            println!("✓ Token valid! Logged in as @{login}");
            println!("  Token stored in {}", store.secrets_path().display());
            Ok(())
        }
        Err(e) => {
            // Don't keep a token GitHub rejects
            store.delete_token()?;
            Err(e)
        }
    }
}

/// Handle the logout command
fn handle_logout() -> Result<()> {
    let store = ConfigStore::open_default()?;
    if store.token()?.is_none() {
        println!("Not currently authenticated.");
        return Ok(());
    }

    store.delete_token()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Handle the status command
fn handle_status() -> Result<()> {
    let store = ConfigStore::open_default()?;

    match store.token()? {
        Some(token) => {
            println!("GitHub: authenticated");
            println!("  Token: {}", ConfigStore::mask_token(&token));
        }
        None => println!("GitHub: not authenticated"),
    }

    match store.mapping()? {
        Some(mapping) => {
            println!("Vault: {}", mapping.vault_path.display());
            println!("  Repository: {}", mapping.repo_full_name);
            println!("  Remote: {}", mapping.remote_url);
        }
        None => println!("Vault: not configured"),
    }

    Ok(())
}

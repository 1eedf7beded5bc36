//! Pull CLI command handler

use crate::cli::prompt;
use crate::core::{ConfigStore, VaultRepo};
use crate::error::{Result, SyncError};

/// Handle the pull command: fetch changes and show what arrived
pub async fn handle_pull() -> Result<()> {
    let store = ConfigStore::open_default()?;
    let mapping = store.mapping()?.ok_or(SyncError::NotConfigured)?;

    let repo = VaultRepo::open(&mapping.vault_path)?;

    println!("Pulling latest changes...");
    let (old_rev, new_rev) = repo.pull()?;

    if old_rev == new_rev {
        println!("Already up to date.");
        return Ok(());
    }

    let changes = repo.diff_summary(&old_rev, &new_rev)?;
    prompt::render_changes("Changes pulled from GitHub:", &changes);
    println!("✓ Pulled latest changes from {}", mapping.repo_full_name);
    Ok(())
}

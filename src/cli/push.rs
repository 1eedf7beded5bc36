//! Push CLI command handler

use crate::cli::commands::PushArgs;
use crate::cli::prompt::{self, StdinConfirm};
use crate::core::security::ConfirmPrompt;
use crate::core::{ConfigStore, PushOutcome, VaultRepo};
use crate::error::{Result, SyncError};

/// Handle the push command: preview, confirm, commit and push
pub async fn handle_push(args: PushArgs) -> Result<()> {
    let store = ConfigStore::open_default()?;
    let mapping = store.mapping()?.ok_or(SyncError::NotConfigured)?;

    let repo = VaultRepo::open(&mapping.vault_path)?;

    let changes = repo.changed_files()?;
    if changes.is_empty() {
        println!("No changes to commit.");
        return Ok(());
    }

    prompt::render_changes("Changes to be committed:", &changes);

    if !StdinConfirm.confirm("Commit and push these changes?") {
        println!("Operation cancelled.");
        return Ok(());
    }

    match repo.commit_and_push(args.message.as_deref())? {
        PushOutcome::Pushed { .. } => {
            println!("✓ Changes pushed to {}", mapping.repo_full_name);
        }
        PushOutcome::NoChanges => println!("No changes to commit."),
    }
    Ok(())
}

//! Update CLI command handler
//!
//! Reports whether a newer release is available. The install itself is left
//! to the package manager.

use crate::core::update_checker;
use crate::error::Result;

/// Handle the update command
pub async fn handle_update() -> Result<()> {
    println!("Checking for updates...");

    let latest = update_checker::latest_release_version().await?;
    let current = env!("CARGO_PKG_VERSION");

    if latest == current {
        println!("You are already running the latest version ({current}).");
        return Ok(());
    }

    println!("New version available: {latest}");
    println!("Current version: {current}");
    println!();
    println!("Update with: cargo install obsync");
    Ok(())
}

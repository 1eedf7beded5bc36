//! Interactive prompts and change-summary rendering
//!
//! The one place the core's injected `confirm` capability is implemented:
//! plain stdin/stdout, no presentation library.

use std::io::{self, Write};

use crate::core::security::ConfirmPrompt;
use crate::core::ChangeSet;
use crate::error::Result;

/// Stdin-backed confirmation prompt. Defaults to "no" on empty input.
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Read one line of input after a prompt.
pub fn prompt_line(question: &str) -> Result<String> {
    print!("{question}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read one line of input, falling back to a default on empty entry.
pub fn prompt_line_with_default(question: &str, default: &str) -> Result<String> {
    print!("{question} [{default}]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    Ok(if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    })
}

/// Read a secret without echoing it.
pub fn prompt_secret(question: &str) -> Result<String> {
    let value = rpassword::prompt_password(format!("{question}: "))?;
    Ok(value.trim().to_string())
}

/// Print a change summary grouped by status.
pub fn render_changes(title: &str, changes: &ChangeSet) {
    println!("{title}");

    render_group("Modified", &changes.modified);
    render_group("Added", &changes.added);
    render_group("Deleted", &changes.deleted);
    if !changes.renamed.is_empty() {
        println!("  Renamed:");
        for (old, new) in &changes.renamed {
            println!("    {old} → {new}");
        }
    }
    render_group("Untracked", &changes.untracked);
}

fn render_group(label: &str, files: &[String]) {
    if files.is_empty() {
        return;
    }
    println!("  {label}:");
    for file in files {
        println!("    {file}");
    }
}

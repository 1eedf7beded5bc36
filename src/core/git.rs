//! Vault repository bootstrap and sync engine
//!
//! This module provides a wrapper around git2 for the vault's local
//! repository:
//! - Idempotent bootstrap: ignore file, init-or-open, origin rebind,
//!   initial commit, `main` branch, first push
//! - Commit/push and fetch/merge cycles
//! - Change classification (working tree vs index, revision vs revision)
//!
//! Local operations go through git2; network transfer and object-store
//! maintenance shell out to the system git binary, whose transport stack
//! handles the credentialed HTTPS remote. Error text from git is scrubbed
//! of credentials before it can reach the terminal.

use std::path::Path;
use std::process::Command;

use chrono::Local;
use git2::{
    BranchType, Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Repository,
    RepositoryInitOptions, Signature, StatusOptions,
};
use tracing::debug;

use crate::core::security::{
    sanitize_error_message, sanitize_url_for_display, validate_remote_url, ConfirmPrompt,
};
use crate::error::{Result, SyncError};

/// Default ignore rules seeded into a fresh vault. Created only if absent,
/// never overwritten.
pub const DEFAULT_GITIGNORE: &str = "\
# Obsync defaults
.env
.DS_Store
Thumbs.db
node_modules/
.obsidian/workspace
.obsidian/workspace.json
.obsidian/plugins/**/node_modules/
.obsidian/plugins/**/data.json
.obsidian/cache/
.trash/
*.code-workspace
*.swp
*.swo
";

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH: &str = "main";
const INITIAL_COMMIT_MESSAGE: &str = "Initial commit by Obsync";

/// Classified file-level differences between two states.
///
/// `untracked` is only populated for working-tree-vs-index comparisons; it
/// is meaningless between two commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<(String, String)>,
    pub untracked: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.untracked.is_empty()
    }
}

/// Outcome of a commit-and-push cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A commit was created and pushed
    Pushed {
        /// Id of the commit that was pushed
        commit: String,
    },
    /// Working tree was clean; nothing committed, no network contact
    NoChanges,
}

/// Wrapper for the vault's local git repository.
///
/// The underlying repository handle is released when the value is dropped,
/// on every exit path.
pub struct VaultRepo {
    repo: Repository,
}

impl VaultRepo {
    /// Open an existing vault repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())
            .map_err(|_| SyncError::NotGitRepository(path.as_ref().display().to_string()))?;
        Ok(Self { repo })
    }

    /// Bootstrap a vault repository and push it upstream.
    ///
    /// Idempotent: safe to re-run with the same or a different remote URL.
    /// The `origin` remote always reflects the URL of the latest call.
    pub fn init<P: AsRef<Path>>(
        path: P,
        remote_url: &str,
        confirm: &dyn ConfirmPrompt,
    ) -> Result<Self> {
        let repo = Self::bootstrap(path, remote_url, confirm)?;
        repo.push_upstream()?;
        Ok(repo)
    }

    /// Local half of [`VaultRepo::init`]: everything except the first push.
    pub fn bootstrap<P: AsRef<Path>>(
        path: P,
        remote_url: &str,
        confirm: &dyn ConfirmPrompt,
    ) -> Result<Self> {
        let path = path.as_ref();
        let remote_url = validate_remote_url(remote_url, confirm)?;

        ensure_gitignore(path)?;

        let repo = if path.join(".git").exists() {
            Repository::open(path)?
        } else {
            let mut opts = RepositoryInitOptions::new();
            opts.initial_head(DEFAULT_BRANCH);
            Repository::init_opts(path, &opts)?
        };
        let vault = Self { repo };

        // Rebind origin unconditionally so it reflects the latest URL
        if vault.repo.find_remote(DEFAULT_REMOTE).is_ok() {
            if let Err(e) = vault.repo.remote_delete(DEFAULT_REMOTE) {
                debug!("ignoring origin cleanup failure: {e}");
            }
        }
        vault.repo.remote(DEFAULT_REMOTE, &remote_url)?;

        if !vault.is_clean()? || vault.repo.head().is_err() {
            vault.stage_all()?;
            vault.commit(INITIAL_COMMIT_MESSAGE)?;
            vault.gc();
        }

        vault.ensure_main_branch()?;
        Ok(vault)
    }

    /// Stage everything, commit, and push to `origin main`.
    ///
    /// A clean working tree with no untracked files short-circuits to
    /// [`PushOutcome::NoChanges`] without creating a commit or touching the
    /// network. The commit message defaults to a timestamped one.
    pub fn commit_and_push(&self, message: Option<&str>) -> Result<PushOutcome> {
        self.stage_all()?;
        if self.is_clean()? {
            return Ok(PushOutcome::NoChanges);
        }

        let generated;
        let message = match message {
            Some(m) => m,
            None => {
                generated = format!(
                    "obsync: update {}",
                    Local::now().format("%Y-%m-%dT%H:%M:%S")
                );
                &generated
            }
        };

        let commit = self.commit(message)?;
        self.gc();
        self.git(&["push", DEFAULT_REMOTE, "HEAD:main"])
            .map_err(SyncError::PushFailed)?;

        Ok(PushOutcome::Pushed { commit })
    }

    /// Pull from `origin main`, rebase-first with a merge fallback.
    ///
    /// Returns the head revision ids from before and after; equal ids mean
    /// the vault was already up to date.
    pub fn pull(&self) -> Result<(String, String)> {
        let old = self.head_commit_id()?;
        self.gc();

        if let Err(rebase_err) = self.git(&["pull", "--rebase", DEFAULT_REMOTE, DEFAULT_BRANCH]) {
            debug!("rebase pull failed, falling back to merge: {rebase_err}");
            // Leave no half-applied rebase behind before the fallback
            if let Err(e) = self.git(&["rebase", "--abort"]) {
                debug!("no rebase to abort: {e}");
            }
            self.git(&["pull", DEFAULT_REMOTE, DEFAULT_BRANCH])
                .map_err(classify_pull_failure)?;
        }

        let new = self.head_commit_id()?;
        Ok((old, new))
    }

    /// Classify working-tree changes against the index.
    ///
    /// Read-only; safe to call repeatedly.
    pub fn changed_files(&self) -> Result<ChangeSet> {
        let mut opts = DiffOptions::new();
        let mut diff = self.repo.diff_index_to_workdir(None, Some(&mut opts))?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        let mut changes = classify_diff(&diff);

        let mut status_opts = StatusOptions::new();
        status_opts.include_untracked(true).recurse_untracked_dirs(true);
        for entry in self.repo.statuses(Some(&mut status_opts))?.iter() {
            if entry.status().contains(git2::Status::WT_NEW) {
                if let Some(path) = entry.path() {
                    changes.untracked.push(path.to_string());
                }
            }
        }

        Ok(changes)
    }

    /// Classify the changes between two committed revisions.
    pub fn diff_summary(&self, old_rev: &str, new_rev: &str) -> Result<ChangeSet> {
        let old_tree = self.repo.revparse_single(old_rev)?.peel_to_commit()?.tree()?;
        let new_tree = self.repo.revparse_single(new_rev)?.peel_to_commit()?.tree()?;

        let mut diff = self.repo.diff_tree_to_tree(
            Some(&old_tree),
            Some(&new_tree),
            Some(&mut DiffOptions::new()),
        )?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        Ok(classify_diff(&diff))
    }

    /// Current head commit id.
    pub fn head_commit_id(&self) -> Result<String> {
        let head = self
            .repo
            .head()
            .map_err(|e| match e.code() {
                ErrorCode::UnbornBranch | ErrorCode::NotFound => {
                    SyncError::Runtime("Vault has no commits yet".to_string())
                }
                _ => e.into(),
            })?;
        Ok(head.peel_to_commit()?.id().to_string())
    }

    /// URL the `origin` remote currently points at.
    pub fn origin_url(&self) -> Result<String> {
        let remote = self.repo.find_remote(DEFAULT_REMOTE)?;
        remote
            .url()
            .map(|u| u.to_string())
            .ok_or_else(|| SyncError::Runtime("origin has no URL".to_string()))
    }

    /// Stage all working-tree changes, including deletions.
    fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// True when the working tree has no staged, unstaged, or untracked
    /// entries.
    fn is_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        Ok(self.repo.statuses(Some(&mut opts))?.is_empty())
    }

    /// Create a commit from the index, handling the unborn-HEAD case.
    fn commit(&self, message: &str) -> Result<String> {
        let signature = self
            .repo
            .signature()
            .or_else(|_| Signature::now("obsync", "obsync@localhost"))?;

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(commit_id.to_string())
    }

    /// Rename the current branch to `main` if it carries another name.
    fn ensure_main_branch(&self) -> Result<()> {
        let head = match self.repo.head() {
            Ok(head) => head,
            // Unborn HEAD: point it at main so the first commit lands there
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                self.repo.set_head("refs/heads/main")?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(());
        }
        let Some(name) = head.shorthand().map(|s| s.to_string()) else {
            return Ok(());
        };
        if name != DEFAULT_BRANCH {
            let mut branch = self.repo.find_branch(&name, BranchType::Local)?;
            branch.rename(DEFAULT_BRANCH, true)?;
            self.repo.set_head("refs/heads/main")?;
        }
        Ok(())
    }

    /// First push with upstream tracking.
    ///
    /// Falls back to an explicit `HEAD:main` push followed by a second
    /// tracking attempt; both failing is a [`SyncError::PushFailed`].
    fn push_upstream(&self) -> Result<()> {
        if let Err(first) = self.git(&["push", "-u", DEFAULT_REMOTE, DEFAULT_BRANCH]) {
            debug!("upstream push failed, retrying with explicit refspec: {first}");
            self.git(&["push", DEFAULT_REMOTE, "HEAD:main"])
                .and_then(|_| self.git(&["push", "-u", DEFAULT_REMOTE, DEFAULT_BRANCH]))
                .map_err(SyncError::PushFailed)?;
        }
        Ok(())
    }

    /// Best-effort object-store compaction. Never aborts the operation.
    fn gc(&self) {
        if let Err(e) = self.git(&["gc", "--quiet"]) {
            debug!("object store compaction failed: {e}");
        }
    }

    /// Run a git subcommand in the vault working directory.
    ///
    /// Stderr is scrubbed of credentials before it lands in an error value,
    /// since git prints remote URLs verbatim on failure.
    fn git(&self, args: &[&str]) -> std::result::Result<String, String> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| "repository has no working directory".to_string())?;

        let output = Command::new("git")
            .current_dir(workdir)
            .args(args)
            .output()
            .map_err(|e| format!("failed to execute git {}: {e}", args[0]))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(scrub(stderr.trim()))
        }
    }
}

/// Seed the vault's ignore file if it does not exist yet. User edits are
/// never overwritten.
pub fn ensure_gitignore(path: &Path) -> Result<()> {
    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        std::fs::write(&gitignore, DEFAULT_GITIGNORE)?;
    }
    Ok(())
}

fn classify_diff(diff: &Diff<'_>) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for delta in diff.deltas() {
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());
        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());

        match delta.status() {
            Delta::Renamed => {
                if let (Some(old), Some(new)) = (old_path, new_path) {
                    changes.renamed.push((old, new));
                }
            }
            Delta::Deleted => {
                if let Some(old) = old_path {
                    changes.deleted.push(old);
                }
            }
            Delta::Added => {
                if let Some(new) = new_path {
                    changes.added.push(new);
                }
            }
            Delta::Modified | Delta::Typechange => {
                if let Some(path) = new_path.or(old_path) {
                    changes.modified.push(path);
                }
            }
            _ => {}
        }
    }

    changes
}

/// Map a failed merge-style pull onto the error taxonomy. Conflicting or
/// unrelated histories are an explicit conflict, not a generic failure.
fn classify_pull_failure(stderr: String) -> SyncError {
    let lower = stderr.to_lowercase();
    if lower.contains("conflict")
        || lower.contains("automatic merge failed")
        || lower.contains("unrelated histories")
        || lower.contains("needs merge")
    {
        SyncError::MergeConflict(stderr)
    } else {
        SyncError::PullFailed(stderr)
    }
}

fn scrub(text: &str) -> String {
    sanitize_error_message(&sanitize_url_for_display(text), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_confirm(_: &str) -> bool {
        panic!("no confirmation expected for local remotes");
    }

    /// A local bare repository standing in for GitHub.
    fn bare_remote(dir: &TempDir) -> String {
        let remote = dir.path().join("remote.git");
        Repository::init_bare(&remote).unwrap();
        remote.display().to_string()
    }

    fn vault_dir(dir: &TempDir) -> std::path::PathBuf {
        let vault = dir.path().join("vault");
        fs::create_dir_all(&vault).unwrap();
        vault
    }

    #[test]
    fn test_ensure_gitignore_preserves_user_edits() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);

        ensure_gitignore(&vault).unwrap();
        let seeded = fs::read_to_string(vault.join(".gitignore")).unwrap();
        assert_eq!(seeded, DEFAULT_GITIGNORE);

        fs::write(vault.join(".gitignore"), "custom-rule\n").unwrap();
        ensure_gitignore(&vault).unwrap();
        let kept = fs::read_to_string(vault.join(".gitignore")).unwrap();
        assert_eq!(kept, "custom-rule\n");
    }

    #[test]
    fn test_init_fresh_vault() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "# hello\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();

        assert!(vault.join(".gitignore").exists());
        assert!(vault.join(".git").exists());
        // Exactly one commit on main, pushed upstream
        let head = repo.repo.head().unwrap();
        assert_eq!(head.shorthand(), Some("main"));
        let commit = head.peel_to_commit().unwrap();
        assert_eq!(commit.message().unwrap(), "Initial commit by Obsync");
        assert_eq!(commit.parent_count(), 0);

        let bare = Repository::open_bare(dir.path().join("remote.git")).unwrap();
        let remote_head = bare.find_reference("refs/heads/main").unwrap();
        assert_eq!(remote_head.target().unwrap(), commit.id());
    }

    #[test]
    fn test_reinit_rebinds_single_origin_to_latest_url() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let first = bare_remote(&dir);
        fs::write(vault.join("note.md"), "one\n").unwrap();

        VaultRepo::init(&vault, &first, &no_confirm).unwrap();

        let second = dir.path().join("second.git");
        Repository::init_bare(&second).unwrap();
        let second = second.display().to_string();

        let repo = VaultRepo::init(&vault, &second, &no_confirm).unwrap();

        let remotes = repo.repo.remotes().unwrap();
        let names: Vec<_> = remotes.iter().flatten().collect();
        assert_eq!(names, vec!["origin"]);
        assert_eq!(repo.origin_url().unwrap(), second);
    }

    #[test]
    fn test_changed_files_classification() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("tracked.md"), "original\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();

        fs::write(vault.join("tracked.md"), "edited\n").unwrap();
        fs::write(vault.join("fresh.md"), "new\n").unwrap();

        let changes = repo.changed_files().unwrap();
        assert_eq!(changes.modified, vec!["tracked.md".to_string()]);
        assert_eq!(changes.untracked, vec!["fresh.md".to_string()]);
        assert!(changes.added.is_empty());
        assert!(changes.deleted.is_empty());
        assert!(changes.renamed.is_empty());
    }

    #[test]
    fn test_changed_files_sees_deletions() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("doomed.md"), "bye\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        fs::remove_file(vault.join("doomed.md")).unwrap();

        let changes = repo.changed_files().unwrap();
        assert_eq!(changes.deleted, vec!["doomed.md".to_string()]);
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_commit_and_push_no_changes_skips_commit_and_network() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "hello\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        let before = repo.head_commit_id().unwrap();

        // Break the remote: a push attempt would fail loudly
        fs::remove_dir_all(dir.path().join("remote.git")).unwrap();

        let outcome = repo.commit_and_push(None).unwrap();
        assert_eq!(outcome, PushOutcome::NoChanges);
        assert_eq!(repo.head_commit_id().unwrap(), before);
    }

    #[test]
    fn test_commit_and_push_default_message() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "hello\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        fs::write(vault.join("note.md"), "hello again\n").unwrap();

        match repo.commit_and_push(None).unwrap() {
            PushOutcome::Pushed { commit } => {
                let oid = git2::Oid::from_str(&commit).unwrap();
                let commit = repo.repo.find_commit(oid).unwrap();
                assert!(commit.message().unwrap().starts_with("obsync: update "));
            }
            PushOutcome::NoChanges => panic!("expected a push"),
        }
    }

    #[test]
    fn test_push_failure_keeps_local_commit() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "hello\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        let before = repo.head_commit_id().unwrap();

        fs::remove_dir_all(dir.path().join("remote.git")).unwrap();
        fs::write(vault.join("note.md"), "changed\n").unwrap();

        match repo.commit_and_push(Some("stranded commit")) {
            Err(SyncError::PushFailed(_)) => {}
            other => panic!("expected PushFailed, got {other:?}"),
        }
        // The commit survived the transport failure
        let after = repo.head_commit_id().unwrap();
        assert_ne!(before, after);
        let changes = repo.changed_files().unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_pull_without_remote_changes_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "hello\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();

        let (old, new) = repo.pull().unwrap();
        assert_eq!(old, new);
        // Second pull with no intervening remote changes: still equal
        let (old, new) = repo.pull().unwrap();
        assert_eq!(old, new);
    }

    #[test]
    fn test_diff_summary_between_revisions() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("a.md"), "a\n").unwrap();

        let repo = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        let old = repo.head_commit_id().unwrap();

        fs::write(vault.join("a.md"), "a changed\n").unwrap();
        fs::write(vault.join("b.md"), "b\n").unwrap();
        repo.commit_and_push(Some("second")).unwrap();
        let new = repo.head_commit_id().unwrap();

        let changes = repo.diff_summary(&old, &new).unwrap();
        assert_eq!(changes.modified, vec!["a.md".to_string()]);
        assert_eq!(changes.added, vec!["b.md".to_string()]);
        assert!(changes.untracked.is_empty());
    }

    #[test]
    fn test_bootstrap_adopts_existing_history() {
        let dir = TempDir::new().unwrap();
        let vault = vault_dir(&dir);
        let remote = bare_remote(&dir);
        fs::write(vault.join("note.md"), "hello\n").unwrap();

        let first = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        let head = first.head_commit_id().unwrap();
        drop(first);

        // Re-running against a clean tree must not create a second commit
        let again = VaultRepo::init(&vault, &remote, &no_confirm).unwrap();
        assert_eq!(again.head_commit_id().unwrap(), head);
    }
}

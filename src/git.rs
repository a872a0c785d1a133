//! Git integration: branch naming and the branch operations `start` needs.

use crate::error::GitError;
use crate::types::{DEFAULT_BRANCH_PREFIX, Task};
use regex_lite::Regex;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::LazyLock;
use tracing::debug;

/// Maximum slug length before the id and prefix are added.
const MAX_SLUG_LENGTH: usize = 50;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static pattern"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("static pattern"));

/// Branch operations the lifecycle engine depends on.
pub trait BranchOps {
    /// Whether the working directory is inside a git work tree.
    fn is_inside_repository(&self) -> bool;

    /// Create `name` from the current HEAD and check it out.
    fn create_and_switch_branch(&self, name: &str) -> Result<(), GitError>;
}

impl<B: BranchOps + ?Sized> BranchOps for &B {
    fn is_inside_repository(&self) -> bool {
        (**self).is_inside_repository()
    }

    fn create_and_switch_branch(&self, name: &str) -> Result<(), GitError> {
        (**self).create_and_switch_branch(name)
    }
}

/// Derive the branch name for a task: `<prefix><id>-<slug>`.
///
/// The slug is the lower-cased title reduced to ASCII word characters and
/// hyphens, capped at 50 characters. Any Unicode whitespace separates words.
/// When nothing survives (e.g. a title written entirely in a non-Latin
/// script) the result is `<prefix><id>`.
pub fn generate_branch_name(task: &Task, prefix: Option<&str>) -> String {
    let prefix = prefix.unwrap_or(DEFAULT_BRANCH_PREFIX);
    // The patterns only know ASCII whitespace
    let lowered: String = task
        .title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    let trimmed = hyphenated.trim_matches('-');
    // Only ASCII remains, so char and byte counts agree
    let truncated: String = trimmed.chars().take(MAX_SLUG_LENGTH).collect();
    let slug = truncated.trim_matches('-');

    if slug.is_empty() {
        format!("{}{}", prefix, task.id)
    } else {
        format!("{}{}-{}", prefix, task.id, slug)
    }
}

/// [`BranchOps`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Name of the checked-out branch.
    pub fn current_branch(&self) -> Result<String, GitError> {
        let output = self
            .run(&["rev-parse", "--abbrev-ref", "HEAD"])
            .map_err(|e| GitError::with_source("failed to read the current branch", e))?;
        if !output.status.success() {
            return Err(GitError::new(format!(
                "failed to read the current branch: {}",
                stderr_of(&output)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Whether a local branch called `name` exists.
    pub fn branch_exists(&self, name: &str) -> bool {
        let reference = format!("refs/heads/{}", name);
        self.run(&["rev-parse", "--verify", "--quiet", &reference])
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        debug!(args = ?args, dir = %self.work_dir.display(), "Running git");
        Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .output()
    }
}

impl BranchOps for GitCli {
    fn is_inside_repository(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .map(|output| {
                output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true"
            })
            .unwrap_or(false)
    }

    fn create_and_switch_branch(&self, name: &str) -> Result<(), GitError> {
        if self.branch_exists(name) {
            return Err(GitError::new(format!("branch already exists: {}", name)));
        }

        let from = self.current_branch().ok();
        let output = self
            .run(&["checkout", "-b", name])
            .map_err(|e| GitError::with_source(format!("failed to create branch: {}", name), e))?;
        if !output.status.success() {
            return Err(GitError::new(format!(
                "failed to create branch: {}: {}",
                name,
                stderr_of(&output)
            )));
        }

        debug!(branch = name, from = ?from, "Switched to new branch");
        Ok(())
    }
}

/// [`BranchOps`] for runs that must never touch git.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGit;

impl BranchOps for NoGit {
    fn is_inside_repository(&self) -> bool {
        false
    }

    fn create_and_switch_branch(&self, name: &str) -> Result<(), GitError> {
        Err(GitError::new(format!(
            "git integration is disabled; cannot create {}",
            name
        )))
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

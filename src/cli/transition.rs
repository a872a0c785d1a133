//! `task show`, `start`, `done`, `archive` and `delete`.

use crate::clock::Clock;
use crate::error::TaskResult;
use crate::git::BranchOps;
use crate::manager::TaskManager;
use crate::storage::Storage;
use crate::types::{Task, TaskId};
use crate::validate;
use clap::Args;

/// A single task id.
#[derive(Args, Debug)]
pub struct IdArgs {
    /// Task id
    pub id: String,
}

impl IdArgs {
    pub fn task_id(&self) -> TaskResult<TaskId> {
        Ok(validate::validate_task_id(&self.id)?)
    }
}

/// A task id for a command that asks before acting.
#[derive(Args, Debug)]
pub struct ConfirmedIdArgs {
    /// Task id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl ConfirmedIdArgs {
    pub fn task_id(&self) -> TaskResult<TaskId> {
        Ok(validate::validate_task_id(&self.id)?)
    }
}

/// Lifecycle commands that require confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedAction {
    Complete,
    Archive,
    Delete,
}

impl ConfirmedAction {
    pub fn question(&self, id: TaskId) -> String {
        match self {
            ConfirmedAction::Complete => format!("Mark task #{} as completed?", id),
            ConfirmedAction::Archive => format!("Archive task #{}?", id),
            ConfirmedAction::Delete => format!("Delete task #{}?", id),
        }
    }

    /// Past tense for the success line.
    pub fn done_verb(&self) -> &'static str {
        match self {
            ConfirmedAction::Complete => "Completed",
            ConfirmedAction::Archive => "Archived",
            ConfirmedAction::Delete => "Deleted",
        }
    }
}

pub fn run_show<S: Storage, G: BranchOps, C: Clock>(
    manager: &TaskManager<S, G, C>,
    args: &IdArgs,
) -> TaskResult<Task> {
    manager.get_task(args.task_id()?)
}

pub fn run_start<S: Storage, G: BranchOps, C: Clock>(
    manager: &TaskManager<S, G, C>,
    args: &IdArgs,
) -> TaskResult<Task> {
    manager.start_task(args.task_id()?)
}

/// Validate the id, ask unless `--yes`, then apply `action`.
///
/// Returns `Ok(None)` when the user declines; nothing is read or written in
/// that case.
pub fn run_confirmed<S, G, C, F>(
    manager: &TaskManager<S, G, C>,
    action: ConfirmedAction,
    args: &ConfirmedIdArgs,
    ask: F,
) -> TaskResult<Option<Task>>
where
    S: Storage,
    G: BranchOps,
    C: Clock,
    F: FnOnce(&str) -> bool,
{
    let id = args.task_id()?;
    if !args.yes && !ask(&action.question(id)) {
        return Ok(None);
    }

    let task = match action {
        ConfirmedAction::Complete => manager.complete_task(id)?,
        ConfirmedAction::Archive => manager.archive_task(id)?,
        ConfirmedAction::Delete => manager.delete_task(id)?,
    };
    Ok(Some(task))
}

//! `task list`

use crate::clock::Clock;
use crate::error::{TaskResult, ValidationError};
use crate::git::BranchOps;
use crate::manager::TaskManager;
use crate::storage::Storage;
use crate::types::{Task, TaskFilter};
use crate::validate;
use clap::Args;

/// Arguments for the list command.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tasks with this status (open, in_progress, completed, archived)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Only tasks with this priority (high, medium, low)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Sort field: id, priority, dueDate or createdAt
    #[arg(long)]
    pub sort: Option<String>,
}

impl ListArgs {
    pub fn to_filter(&self) -> Result<TaskFilter, ValidationError> {
        Ok(TaskFilter {
            status: self
                .status
                .as_deref()
                .map(validate::validate_status)
                .transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(validate::validate_priority)
                .transpose()?,
            sort_by: self
                .sort
                .as_deref()
                .map(validate::validate_sort_field)
                .transpose()?,
        })
    }
}

pub fn run_list<S: Storage, G: BranchOps, C: Clock>(
    manager: &TaskManager<S, G, C>,
    args: &ListArgs,
) -> TaskResult<Vec<Task>> {
    let filter = args.to_filter()?;
    manager.list_tasks(&filter)
}

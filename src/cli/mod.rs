//! CLI command definitions for `task`.
//!
//! Arguments arrive as plain strings and go through the validation layer in
//! the `run_*` functions, so malformed input surfaces as a validation error
//! (exit code 1) rather than a clap usage error.

pub mod add;
pub mod backups;
pub mod confirm;
pub mod edit;
pub mod list;
pub mod transition;

use crate::format::OutputFormat;
use add::AddArgs;
use clap::{Parser, Subcommand};
use edit::EditArgs;
use list::ListArgs;
use std::path::PathBuf;
use transition::{ConfirmedIdArgs, IdArgs};

/// Local task tracker with git branch integration
#[derive(Parser, Debug)]
#[command(name = "task", author, version, about, long_about = None)]
pub struct Cli {
    /// Storage directory (default: ./.task)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off (default), 1/stdout, 2/stderr, or filename
    #[arg(long, default_value = "0", global = true)]
    pub log: String,

    /// Never create git branches, even inside a repository
    #[arg(long, global = true)]
    pub no_git: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a task
    Add(AddArgs),

    /// List tasks
    List(ListArgs),

    /// Show one task in detail
    Show(IdArgs),

    /// Change a task's title, description, priority or due date
    Edit(EditArgs),

    /// Start a task and create its git branch
    Start(IdArgs),

    /// Mark an in-progress task as completed
    Done(ConfirmedIdArgs),

    /// Archive an open or completed task
    Archive(ConfirmedIdArgs),

    /// Delete an open or in-progress task
    Delete(ConfirmedIdArgs),

    /// List retained backups of the task file
    Backups,
}

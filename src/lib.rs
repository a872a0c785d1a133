//! Local developer task tracker.
//!
//! Tasks live as JSON under a storage directory (`./.task/` by default) and
//! move through `open → in_progress → completed → archived`. Starting a task
//! inside a git work tree creates and checks out a branch for it.

pub mod cli;
pub mod clock;
pub mod error;
pub mod format;
pub mod git;
pub mod manager;
pub mod settings;
pub mod storage;
pub mod types;
pub mod validate;

//! Output formatting for plain text and JSON.

use crate::error::TaskError;
use crate::types::Task;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Titles longer than this are cut in list output.
const LIST_TITLE_WIDTH: usize = 40;
const ELLIPSIS: &str = "...";
const EMPTY_CELL: &str = "-";
const HEADERS: [&str; 6] = ["ID", "Status", "Title", "Priority", "Branch", "Due"];

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Render tasks as an aligned table. `today` anchors the relative due dates.
pub fn format_task_list(tasks: &[Task], today: NaiveDate) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }

    let rows: Vec<[String; 6]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.to_string(),
                task.status.to_string(),
                truncate(&task.title, LIST_TITLE_WIDTH),
                task.priority
                    .map_or_else(|| EMPTY_CELL.to_string(), |p| p.to_string()),
                task.branch.clone().unwrap_or_else(|| EMPTY_CELL.to_string()),
                format_due(task.due_date.as_deref(), today),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Render every field of one task.
pub fn format_task_detail(task: &Task) -> String {
    let or_empty = |v: Option<&str>| v.unwrap_or(EMPTY_CELL).to_string();

    let mut lines = vec![
        format!("Task #{}", task.id),
        format!("  Title       : {}", task.title),
        format!("  Status      : {}", task.status),
        format!(
            "  Priority    : {}",
            or_empty(task.priority.as_ref().map(|p| p.as_str()))
        ),
        format!("  Branch      : {}", or_empty(task.branch.as_deref())),
        format!("  Due         : {}", or_empty(task.due_date.as_deref())),
        format!("  Created     : {}", task.created_at),
        format!("  Updated     : {}", task.updated_at),
    ];

    if let Some(ref completed) = task.completed_at {
        lines.push(format!("  Completed   : {}", completed));
    }
    if let Some(number) = task.github_issue_number {
        lines.push(format!("  Issue       : #{}", number));
    }
    if let Some(ref desc) = task.description {
        lines.push("  Description :".to_string());
        lines.extend(desc.lines().map(|line| format!("    {}", line)));
    }

    lines.join("\n")
}

pub fn format_success(message: &str) -> String {
    format!("✓ {}", message)
}

pub fn format_error(message: &str) -> String {
    format!("✗ {}", message)
}

/// JSON envelope for a failed command.
pub fn error_to_json(err: &TaskError) -> Value {
    let mut body = json!({
        "kind": err.kind(),
        "message": err.to_string(),
    });
    if let Some(field) = err.field() {
        body["field"] = json!(field);
    }
    json!({ "error": body })
}

/// Pretty JSON for any serializable result.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Cut to `max` characters, ending in `...` when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - ELLIPSIS.len()).collect();
    format!("{}{}", kept, ELLIPSIS)
}

/// Due date with the distance from `today`, e.g. `2026-10-21 (in 2 days)`.
fn format_due(due: Option<&str>, today: NaiveDate) -> String {
    let Some(due) = due else {
        return EMPTY_CELL.to_string();
    };
    let Ok(date) = NaiveDate::parse_from_str(due, "%Y-%m-%d") else {
        return due.to_string();
    };

    match (date - today).num_days() {
        0 => format!("{} (today)", due),
        1 => format!("{} (in 1 day)", due),
        -1 => format!("{} (1 day overdue)", due),
        n if n > 0 => format!("{} (in {} days)", due, n),
        n => format!("{} ({} days overdue)", due, -n),
    }
}

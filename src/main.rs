//! `task`: local developer task tracker.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use devtask::cli::backups::{format_backups, run_backups};
use devtask::cli::confirm::confirm_stdin;
use devtask::cli::transition::{
    ConfirmedAction, ConfirmedIdArgs, run_confirmed, run_show, run_start,
};
use devtask::cli::{Cli, Command, add::run_add, edit::run_edit, list::run_list};
use devtask::clock::Clock;
use devtask::error::TaskError;
use devtask::format::{
    OutputFormat, error_to_json, format_error, format_success, format_task_detail,
    format_task_list, to_json,
};
use devtask::git::{BranchOps, GitCli, NoGit};
use devtask::manager::TaskManager;
use devtask::settings::Settings;
use devtask::storage::{FileStorage, Storage};
use devtask::types::Task;
use serde_json::json;
use std::fs::OpenOptions;
use std::process::ExitCode;
use tracing::{Level, debug, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter directives (`RUST_LOG` syntax) that replace the `--verbose` level.
const ENV_LOG_FILTER: &str = "TASK_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log, cli.verbose) {
        eprintln!("{}", format_error(&format!("{:#}", e)));
        return ExitCode::FAILURE;
    }

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", format_error(&format!("{:#}", e)));
            return ExitCode::FAILURE;
        }
    };
    debug!(?settings, "Resolved settings");

    match run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, settings.format);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Initialize logging based on the --log option.
fn init_logging(target: &str, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    match target {
        "0" | "off" => Ok(()),
        "1" | "stdout" => install_subscriber(std::io::stdout, true, level),
        "2" | "stderr" => install_subscriber(std::io::stderr, true, level),
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("failed to open log file {}", filename))?;
            install_subscriber(file, false, level)
        }
    }
}

fn install_subscriber<W>(writer: W, ansi: bool, level: Level) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = FmtSubscriber::builder().with_writer(writer).with_ansi(ansi);
    match std::env::var(ENV_LOG_FILTER) {
        Ok(directives) => {
            let subscriber = builder
                .with_env_filter(EnvFilter::new(directives))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        Err(_) => {
            let subscriber = builder.with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load()?;
    settings.apply_cli(cli.dir.clone(), cli.format, cli.no_git);
    Ok(settings)
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    let storage = FileStorage::new(&settings.storage_dir);
    let git_cli = GitCli::new(std::env::current_dir().context("failed to read working directory")?);
    let git: &dyn BranchOps = if settings.no_git { &NoGit } else { &git_cli };
    let manager = TaskManager::new(&storage, git);
    let format = settings.format;

    match command {
        Command::Add(args) => {
            let task = run_add(&manager, &args)?;
            print_task(format, &format!("Created task #{}", task.id), &task)?;
        }
        Command::List(args) => {
            let tasks = run_list(&manager, &args)?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&tasks)?),
                OutputFormat::Text => {
                    println!("{}", format_task_list(&tasks, Local::now().date_naive()))
                }
            }
        }
        Command::Show(args) => {
            let task = run_show(&manager, &args)?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&task)?),
                OutputFormat::Text => println!("{}", format_task_detail(&task)),
            }
        }
        Command::Edit(args) => {
            let task = run_edit(&manager, &args)?;
            print_task(format, &format!("Updated task #{}", task.id), &task)?;
        }
        Command::Start(args) => {
            let task = run_start(&manager, &args)?;
            let message = match task.branch {
                Some(ref branch) => format!("Started task #{} on branch {}", task.id, branch),
                None => format!("Started task #{}", task.id),
            };
            print_task(format, &message, &task)?;
        }
        Command::Done(args) => confirmed(&manager, ConfirmedAction::Complete, &args, format)?,
        Command::Archive(args) => confirmed(&manager, ConfirmedAction::Archive, &args, format)?,
        Command::Delete(args) => confirmed(&manager, ConfirmedAction::Delete, &args, format)?,
        Command::Backups => {
            let entries = run_backups(&storage).map_err(TaskError::from)?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&entries)?),
                OutputFormat::Text => println!("{}", format_backups(&entries)),
            }
        }
    }
    Ok(())
}

fn confirmed<S, G, C>(
    manager: &TaskManager<S, G, C>,
    action: ConfirmedAction,
    args: &ConfirmedIdArgs,
    format: OutputFormat,
) -> Result<()>
where
    S: Storage,
    G: BranchOps,
    C: Clock,
{
    let outcome = run_confirmed(manager, action, args, |question| {
        confirm_stdin(question).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read confirmation");
            false
        })
    })?;

    let Some(task) = outcome else {
        match format {
            OutputFormat::Json => println!("{}", json!({ "cancelled": true })),
            OutputFormat::Text => println!("Cancelled"),
        }
        return Ok(());
    };

    let message = format!("{} task #{}", action.done_verb(), task.id);
    if action == ConfirmedAction::Delete && format == OutputFormat::Text {
        println!("{}", format_success(&message));
        return Ok(());
    }
    print_task(format, &message, &task)
}

fn print_task(format: OutputFormat, message: &str, task: &Task) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(task)?),
        OutputFormat::Text => {
            println!("{}", format_success(message));
            println!("{}", format_task_detail(task));
        }
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    match (err.downcast_ref::<TaskError>(), format) {
        (Some(task_err), OutputFormat::Json) => eprintln!("{}", error_to_json(task_err)),
        (Some(task_err), OutputFormat::Text) => eprintln!("{}", format_error(&task_err.to_string())),
        (None, _) => eprintln!("{}", format_error(&format!("{:#}", err))),
    }
}

/// Domain errors map to their kind's code; everything else is 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TaskError>()
        .and_then(|e| u8::try_from(e.exit_code()).ok())
        .unwrap_or(1)
}

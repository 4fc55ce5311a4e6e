//! Command-line front end for the taskboard core.
//!
//! # Responsibility
//! - Drive `BoardSession` commands against a SQLite slot database.
//! - Print deterministic, line-oriented output for scripting.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{
    default_log_level, encode, init_logging, BoardSession, EntityId, NewTaskRequest, Registry,
    SnapshotCodec, SqliteSlotStore,
};

const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";

#[derive(Parser)]
#[command(name = "taskboard", version, about = "Projects and tasks from the terminal")]
struct Cli {
    /// SQLite database holding the board snapshot
    #[arg(long, env = "TASKBOARD_DB_PATH", value_name = "PATH")]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "TASKBOARD_LOG_DIR", value_name = "DIR")]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every project with its tasks
    List,
    AddProject {
        name: String,
    },
    RenameProject {
        id: String,
        name: String,
    },
    /// Delete a project and all of its tasks
    RemoveProject {
        id: String,
        /// Required; deletion discards every task in the project
        #[arg(long)]
        yes: bool,
    },
    AddTask {
        /// Target project id
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Due date, e.g. 2025-06-01 or 2025-06-01T09:00:00Z
        #[arg(long)]
        due: String,
    },
    /// Set one of title|description|priority|dueDate
    EditTask {
        id: String,
        field: String,
        value: String,
    },
    ToggleTask {
        id: String,
    },
    RemoveTask {
        id: String,
    },
    MoveTask {
        id: String,
        /// Destination project id
        to: String,
    },
    /// Add sample projects when the board is empty
    Seed,
    /// Print the stored snapshot document
    Export,
    /// Replace an unreadable stored board with an empty one
    Recover {
        /// Required; the unreadable snapshot is overwritten
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let codec = SnapshotCodec::new(SqliteSlotStore::open(&db_path)?);
    let mut session = BoardSession::open_recovering(codec);
    if let Some(err) = session.recovered_from() {
        if !matches!(cli.command, Command::Recover { .. }) {
            return Err(format!("{err} (run `taskboard recover --yes` to start over)").into());
        }
    }

    match cli.command {
        Command::List => print_registry(session.registry()),
        Command::AddProject { name } => {
            let id = session.create_project(&name)?;
            println!("project {id}");
        }
        Command::RenameProject { id, name } => {
            session.rename_project(&EntityId::new(id), &name)?;
        }
        Command::RemoveProject { id, yes } => {
            if !yes {
                return Err("refusing to delete a project without --yes".into());
            }
            let discarded = session.delete_project(&EntityId::new(id))?;
            println!("removed project and {discarded} task(s)");
        }
        Command::AddTask {
            project,
            title,
            description,
            priority,
            due,
        } => {
            let request = NewTaskRequest {
                title,
                description,
                priority,
                due_date: due,
            };
            let id = session.add_task(Some(&EntityId::new(project)), request)?;
            println!("task {id}");
        }
        Command::EditTask { id, field, value } => {
            session.edit_task(&EntityId::new(id), &field, value)?;
        }
        Command::ToggleTask { id } => {
            let done = session.toggle_task(&EntityId::new(id))?;
            println!("completed={done}");
        }
        Command::RemoveTask { id } => session.delete_task(&EntityId::new(id))?,
        Command::MoveTask { id, to } => {
            let moved = session.move_task(&EntityId::new(id), &EntityId::new(to))?;
            println!("moved={moved}");
        }
        Command::Seed => {
            if session.seed_if_empty()? {
                print_registry(session.registry());
            } else {
                println!("board not empty; nothing seeded");
            }
        }
        Command::Export => println!("{}", encode(session.registry())?),
        Command::Recover { yes } => recover(&mut session, yes)?,
    }
    Ok(())
}

fn recover(
    session: &mut BoardSession<SqliteSlotStore>,
    yes: bool,
) -> Result<(), Box<dyn Error>> {
    let Some(err) = session.recovered_from() else {
        println!("stored board is readable; nothing to recover");
        return Ok(());
    };
    if !yes {
        return Err(
            format!("stored board is unreadable ({err}); rerun with --yes to discard it").into(),
        );
    }
    if let Some(err) = session.acknowledge_recovery() {
        println!("discarded unreadable board: {err}");
    }
    session.persist()?;
    Ok(())
}

fn print_registry(registry: &Registry) {
    if registry.is_empty() {
        println!("(no projects)");
        return;
    }
    for project in registry.projects() {
        println!(
            "{} {} [{}/{} done]",
            project.id(),
            project.name,
            project.completed_count(),
            project.len()
        );
        for task in project.todos() {
            let mark = if task.is_completed { 'x' } else { ' ' };
            println!("  [{mark}] {} {}", task.id(), task.describe());
        }
    }
}

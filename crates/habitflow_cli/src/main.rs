//! `habitflow` command-line entry point.
//!
//! # Responsibility
//! - Parse global options (database path, logging) and dispatch subcommands.
//! - Print results as JSON on stdout, failures as `error: ...` on stderr.
//!
//! # Invariants
//! - This binary is the only place that reads the ambient local date.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use uuid::Uuid;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "habitflow", version, about = "HabitFlow habit tracker")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "HABITFLOW_DB", default_value = "habitflow.db")]
    db: PathBuf,
    /// Log level (trace|debug|info|warn|error); needs `--log-dir`
    #[arg(long, global = true, env = "HABITFLOW_LOG_LEVEL", requires = "log_dir")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "HABITFLOW_LOG_DIR")]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Habit catalogue management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Mark a habit completed on a date (default: today)
    Mark {
        habit: Uuid,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove the completion of a habit on a date (default: today)
    Unmark {
        habit: Uuid,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List completions of a habit, optionally within an inclusive range
    Completions {
        habit: Uuid,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Current and longest streak of a habit
    Stats {
        habit: Uuid,
        /// Reference date for the current streak (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(habitflow_core::default_log_level().as_str());
        habitflow_core::init_logging(level, log_dir)?;
    }

    let conn = habitflow_core::db::open_db(&cli.db)?;
    match cli.command {
        Commands::Habit { action } => commands::habit::run(&conn, action),
        Commands::Mark { habit, date } => commands::completion::mark(&conn, habit, date),
        Commands::Unmark { habit, date } => commands::completion::unmark(&conn, habit, date),
        Commands::Completions { habit, from, to } => {
            commands::completion::list(&conn, habit, from.zip(to))
        }
        Commands::Stats { habit, today } => commands::stats::run(&conn, habit, today),
    }
}

//! Perfreview CLI - manage departments, employees and their reviews

mod commands;

use clap::{Parser, Subcommand};
use perfreview::config;
use perfreview::storage::SqliteStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "perfreview")]
#[command(version)]
#[command(about = "Employee performance reviews backed by SQLite")]
#[command(long_about = r#"
Perfreview stores departments, employees and yearly performance reviews in a
single SQLite database.

Example usage:
  perfreview init
  perfreview seed
  perfreview review add --year 2024 --summary "Strong year" --employee 1
  perfreview employee reviews 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the tables
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Drop and recreate every table
    Reset,

    /// Replace the database contents with sample data
    Seed,

    /// Show row counts per table
    Stats,

    /// Manage departments
    #[command(subcommand)]
    Department(DepartmentCommand),

    /// Manage employees
    #[command(subcommand)]
    Employee(EmployeeCommand),

    /// Manage reviews
    #[command(subcommand)]
    Review(ReviewCommand),
}

#[derive(Subcommand)]
pub enum DepartmentCommand {
    /// Add a department
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        location: String,
    },
    /// List every department
    List,
    /// Show one department
    Show { id: i64 },
    /// Change fields of a department
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Delete a department
    Delete { id: i64 },
    /// List the employees of a department
    Employees { id: i64 },
}

#[derive(Subcommand)]
pub enum EmployeeCommand {
    /// Add an employee
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        job_title: String,
        #[arg(long)]
        department: i64,
    },
    /// List every employee
    List,
    /// Show one employee
    Show { id: i64 },
    /// Change fields of an employee
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        job_title: Option<String>,
        #[arg(long)]
        department: Option<i64>,
    },
    /// Delete an employee
    Delete { id: i64 },
    /// List the reviews of an employee
    Reviews { id: i64 },
}

#[derive(Subcommand)]
pub enum ReviewCommand {
    /// Add a review
    Add {
        #[arg(short, long)]
        year: i64,
        #[arg(short, long)]
        summary: String,
        #[arg(short, long)]
        employee: i64,
    },
    /// List every review
    List,
    /// Show one review
    Show { id: i64 },
    /// Change fields of a review
    Update {
        id: i64,
        #[arg(short, long)]
        year: Option<i64>,
        #[arg(short, long)]
        summary: Option<String>,
        #[arg(short, long)]
        employee: Option<i64>,
    },
    /// Delete a review
    Delete { id: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print `value` as pretty JSON
pub fn emit_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(db_path: &Path, foreign_keys: bool) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(db_path)?;
    let store = SqliteStore::open(db_path)?.with_foreign_keys(foreign_keys)?;
    Ok(store)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let cwd = std::env::current_dir()?;
    let loaded = config::load_config(cli.config.as_deref())?;
    let db_path = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref(), &cwd);
    let foreign_keys = loaded.as_ref().map(|c| c.foreign_keys()).unwrap_or(true);
    tracing::debug!("Using database {:?} (foreign keys: {})", db_path, foreign_keys);

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.unwrap_or_else(config::default_config_path);
            commands::run_init(&config_path, &db_path, foreign_keys, force, output_mode)
        }
        Commands::Reset => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_reset(&store, output_mode)
        }
        Commands::Seed => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_seed(&store, output_mode)
        }
        Commands::Stats => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_stats(&store, &db_path, output_mode)
        }
        Commands::Department(command) => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_department(&store, command, output_mode)
        }
        Commands::Employee(command) => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_employee(&store, command, output_mode)
        }
        Commands::Review(command) => {
            let store = open_store(&db_path, foreign_keys)?;
            commands::run_review(&store, command, output_mode)
        }
    }
}

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::import::ImportError;

mod import_jobs;
mod migrate;

#[derive(Parser, Debug)]
#[command(name = "job-importer", about = "Loads job listings from CSV files into the jobs table")]
pub struct Cli {
    #[command(subcommand)]
    command: SubCommandType,
}

#[derive(Subcommand, Debug)]
enum SubCommandType {
    /// Imports job listings from a specified CSV file
    ImportJobs {
        /// The path to the CSV file to import
        csv_file_path: PathBuf,
    },
    /// Applies pending database migrations
    Migrate,
}

/// Errors that end a command with a non-zero exit status
#[derive(Debug)]
pub enum CommandError {
    /// The database pool could not be created
    Connect(sqlx::Error),

    /// Applying migrations failed
    Migrate(sqlx::migrate::MigrateError),

    /// The import itself failed
    Import(ImportError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Connect(e) => write!(f, "Failed to connect to database: {}", e),
            CommandError::Migrate(e) => write!(f, "Failed to run database migrations: {}", e),
            CommandError::Import(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ImportError> for CommandError {
    fn from(e: ImportError) -> Self {
        CommandError::Import(e)
    }
}

pub async fn run(cli: Cli, config: &Config) -> Result<(), CommandError> {
    match cli.command {
        SubCommandType::ImportJobs { csv_file_path } => {
            import_jobs::run(config, &csv_file_path).await
        }
        SubCommandType::Migrate => migrate::run(config).await,
    }
}

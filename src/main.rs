use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

mod cmd;
mod config;
mod db;
mod import;
mod job;
mod logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cmd::Cli::parse();

    // Load configuration from environment
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_dir) {
        eprintln!("Error: failed to create logs directory {}: {}", config.log_dir, e);
        return ExitCode::FAILURE;
    }

    info!("Starting job-importer");
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Batch size: {}", config.batch_size);

    match cmd::run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

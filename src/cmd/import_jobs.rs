use chrono::Local;
use std::path::Path;
use tracing::info;

use super::CommandError;
use crate::config::Config;
use crate::db::{connection, job_repository::JobRepository};
use crate::import::{ImportService, ImportSummary};

pub async fn run(config: &Config, csv_file_path: &Path) -> Result<(), CommandError> {
    // Lazy pool: the file is fully read before the first connection is made
    let pool = connection::get_lazy_connection(&config.database_url, config.max_db_connections)
        .map_err(CommandError::Connect)?;

    let service = ImportService::new(JobRepository::new(pool.clone()), config.batch_size);
    let now = Local::now().naive_local();
    let result = service.import_file(csv_file_path, now).await;

    pool.close().await;
    let summary: ImportSummary = result?;

    for line in summary.report_lines() {
        println!("{}", line);
    }
    info!("Finished importing {} jobs from {}", summary.imported, csv_file_path.display());
    Ok(())
}

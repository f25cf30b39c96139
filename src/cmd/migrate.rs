use tracing::info;

use super::CommandError;
use crate::config::Config;
use crate::db::{connection, migrations};

pub async fn run(config: &Config) -> Result<(), CommandError> {
    let pool = connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .map_err(CommandError::Connect)?;
    info!("Database connection pool established");

    let result = migrations::run_migrations(&pool).await;
    pool.close().await;
    result.map_err(CommandError::Migrate)?;

    println!("Migrations applied successfully");
    Ok(())
}

use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::debug;

use crate::db::store::JobStore;
use crate::job::Job;

/// Repository for Job database operations
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

impl JobStore for JobRepository {
    /// Insert one batch with a single multi-row INSERT
    async fn insert_batch(&self, batch: &[Job]) -> Result<u64, sqlx::Error> {
        if batch.is_empty() {
            debug!("Insert called with empty batch");
            return Ok(0);
        }

        debug!("Inserting batch of {} jobs", batch.len());

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO jobs (title, company, location, link, description, applicants, date) ",
        );
        query.push_values(batch, |mut row, job| {
            row.push_bind(&job.title)
                .push_bind(&job.company)
                .push_bind(&job.location)
                .push_bind(&job.link)
                .push_bind(&job.description)
                .push_bind(job.applicants)
                .push_bind(job.date);
        });

        let result = query.build().execute(&self.pool).await?;
        let rows_affected = result.rows_affected();
        debug!("Batch insert completed: {} rows inserted", rows_affected);

        Ok(rows_affected)
    }
}

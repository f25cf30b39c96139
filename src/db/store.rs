use std::future::Future;

use crate::job::Job;

/// Storage port for job records
///
/// Implementors provide a single-batch insert; `bulk_create` splits the
/// records into batches and sends them in order. There is no enclosing
/// transaction: a failing batch leaves earlier batches in place.
pub trait JobStore: Sync {
    /// Insert one batch and return the number of rows written
    fn insert_batch(&self, batch: &[Job]) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Insert all jobs, `batch_size` at a time, preserving order
    fn bulk_create(
        &self,
        jobs: &[Job],
        batch_size: usize,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send {
        async move {
            let mut inserted = 0;
            for batch in jobs.chunks(batch_size.max(1)) {
                inserted += self.insert_batch(batch).await?;
            }
            Ok(inserted)
        }
    }
}

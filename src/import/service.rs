use chrono::NaiveDateTime;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::db::store::JobStore;
use super::dto::ImportSummary;
use super::reader;

/// Import-level errors
#[derive(Debug)]
pub enum ImportError {
    /// The CSV file could not be opened
    Open { path: PathBuf, source: io::Error },

    /// The CSV file could not be read or is not valid UTF-8
    Read { path: PathBuf, source: csv::Error },

    /// The bulk insert failed
    Store(sqlx::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Open { path, source } => {
                write!(f, "Could not open {}: {}", path.display(), source)
            }
            ImportError::Read { path, source } => {
                write!(f, "Could not read {}: {}", path.display(), source)
            }
            ImportError::Store(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Open { source, .. } => Some(source),
            ImportError::Read { source, .. } => Some(source),
            ImportError::Store(e) => Some(e),
        }
    }
}

/// Orchestrates one CSV import: read, transform, bulk insert, summarize
pub struct ImportService<S> {
    store: S,
    batch_size: usize,
}

impl<S: JobStore> ImportService<S> {
    pub fn new(store: S, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    /// Import every valid row of the CSV file at `path`
    ///
    /// # Returns
    /// - `Ok(ImportSummary)` - all valid rows were inserted
    /// - `Err(ImportError)` - the file could not be opened or decoded, or the
    ///   store rejected a batch. Nothing is inserted in the first two cases.
    pub async fn import_file(
        &self,
        path: &Path,
        now: NaiveDateTime,
    ) -> Result<ImportSummary, ImportError> {
        info!("Importing jobs from {}", path.display());

        let file = File::open(path).map_err(|source| ImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.import_reader(file, path, now).await
    }

    /// Same pipeline over any reader; `source` names it in errors and the summary
    pub async fn import_reader<R: io::Read>(
        &self,
        input: R,
        source: &Path,
        now: NaiveDateTime,
    ) -> Result<ImportSummary, ImportError> {
        let parsed = reader::read_jobs(input, now).map_err(|e| ImportError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        for skipped in &parsed.skipped {
            warn!("Skipping line {}: {}", skipped.line, skipped.reason);
        }

        let imported = parsed.jobs.len();
        if imported == 0 {
            warn!("No valid jobs to insert");
        } else {
            info!(
                "Bulk inserting {} jobs in batches of {}",
                imported, self.batch_size
            );
            let rows_affected = self
                .store
                .bulk_create(&parsed.jobs, self.batch_size)
                .await
                .map_err(ImportError::Store)?;
            debug!("Store reported {} rows written", rows_affected);
        }

        let summary = ImportSummary {
            source: source.to_path_buf(),
            imported,
            skipped: parsed.skipped.len(),
        };
        info!(
            "Import completed: {} imported, {} skipped",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Records every batch it receives; fails from batch `fail_at` onward
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<Job>>>,
        fail_at: Option<usize>,
    }

    impl RecordingStore {
        fn failing_at(batch: usize) -> Self {
            Self {
                fail_at: Some(batch),
                ..Self::default()
            }
        }

        fn batches(&self) -> Vec<Vec<Job>> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl JobStore for RecordingStore {
        async fn insert_batch(&self, batch: &[Job]) -> Result<u64, sqlx::Error> {
            let mut batches = self.batches.lock().unwrap();
            if self.fail_at == Some(batches.len()) {
                return Err(sqlx::Error::Protocol("insert rejected".to_string()));
            }
            batches.push(batch.to_vec());
            Ok(batch.len() as u64)
        }
    }

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn source() -> PathBuf {
        PathBuf::from("jobs.csv")
    }

    #[tokio::test]
    async fn imports_valid_rows_and_counts_skips() {
        let csv = "\
title,company,posted time
Backend Engineer,Acme,2 days ago
Designer,,1 day ago
Data Engineer,Initech,garbage
";
        let service = ImportService::new(RecordingStore::default(), 100);
        let summary = service
            .import_reader(csv.as_bytes(), &source(), reference())
            .await
            .unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.source, source());

        let batches = service.store.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].title, "Backend Engineer");
        assert_eq!(batches[0][0].date, NaiveDate::from_ymd_opt(2024, 3, 13));
    }

    #[tokio::test]
    async fn header_only_file_never_touches_the_store() {
        let service = ImportService::new(RecordingStore::failing_at(0), 100);
        let summary = service
            .import_reader("title,company,posted time\n".as_bytes(), &source(), reference())
            .await
            .unwrap();

        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 0);
        assert!(service.store.batches().is_empty());
    }

    #[tokio::test]
    async fn batches_preserve_source_order() {
        let mut csv = String::from("title,company\n");
        for i in 0..260 {
            // every 26th row lacks a company
            let company = if i % 26 == 0 { "" } else { "Acme" };
            csv.push_str(&format!("job-{},{}\n", i, company));
        }

        let service = ImportService::new(RecordingStore::default(), 100);
        let summary = service
            .import_reader(csv.as_bytes(), &source(), reference())
            .await
            .unwrap();

        assert_eq!(summary.imported, 250);
        assert_eq!(summary.skipped, 10);

        let batches = service.store.batches();
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let expected: Vec<String> = (0..260)
            .filter(|i| i % 26 != 0)
            .map(|i| format!("job-{}", i))
            .collect();
        let inserted: Vec<String> = batches
            .into_iter()
            .flatten()
            .map(|job| job.title)
            .collect();
        assert_eq!(inserted, expected);
    }

    #[tokio::test]
    async fn store_failure_aborts_without_summary() {
        let mut csv = String::from("title,company\n");
        for i in 0..150 {
            csv.push_str(&format!("job-{},Acme\n", i));
        }

        let service = ImportService::new(RecordingStore::failing_at(1), 100);
        let err = service
            .import_reader(csv.as_bytes(), &source(), reference())
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Store(_)));
        // the first batch stays written; there is no rollback
        assert_eq!(service.store.batches().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_fails_before_insertion() {
        let service = ImportService::new(RecordingStore::default(), 100);
        let path = Path::new("definitely/not/here/jobs.csv");
        let err = service.import_file(path, reference()).await.unwrap_err();

        match err {
            ImportError::Open { path: failed, source } => {
                assert_eq!(failed, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected open error, got {:?}", other),
        }
        assert!(service.store.batches().is_empty());
    }

    #[tokio::test]
    async fn undecodable_input_fails_before_insertion() {
        let service = ImportService::new(RecordingStore::default(), 100);
        let err = service
            .import_reader(&b"title,company\nQA,\xfe\n"[..], &source(), reference())
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Read { .. }));
        assert!(err.to_string().starts_with("Could not read jobs.csv"));
        assert!(service.store.batches().is_empty());
    }
}

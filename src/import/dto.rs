use std::path::PathBuf;

/// Result of a successful import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub source: PathBuf,
    pub imported: usize,
    pub skipped: usize,
}

impl ImportSummary {
    /// Lines printed to the console once the import has succeeded
    pub fn report_lines(&self) -> [String; 2] {
        [
            format!("Skipped {} invalid rows.", self.skipped),
            format!(
                "Bulk imported {} jobs from {}",
                self.imported,
                self.source.display()
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_names_counts_and_source() {
        let summary = ImportSummary {
            source: PathBuf::from("data/jobs.csv"),
            imported: 7,
            skipped: 2,
        };
        assert_eq!(
            summary.report_lines(),
            [
                "Skipped 2 invalid rows.".to_string(),
                "Bulk imported 7 jobs from data/jobs.csv".to_string(),
            ]
        );
    }
}

use chrono::NaiveDateTime;
use csv::{Position, ReaderBuilder, StringRecord};
use std::io;
use tracing::{debug, warn};

use crate::job::models::KNOWN_COLUMNS;
use crate::job::posted_time::{self, POSTED_TIME};
use crate::job::{Job, Row, RowError};

/// A row that did not make it into the batch
#[derive(Debug)]
pub struct SkippedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub reason: RowError,
}

/// Outcome of reading a whole CSV source
#[derive(Debug, Default)]
pub struct ParsedJobs {
    /// Valid jobs in source order
    pub jobs: Vec<Job>,
    pub skipped: Vec<SkippedRow>,
}

/// Read every row of a CSV source into jobs.
///
/// Records shorter than the header leave their trailing columns absent and
/// cells beyond the header are ignored. Row-level problems (bad values,
/// unknown posted time) are collected in `skipped`. Anything else, such as
/// invalid UTF-8 or an I/O failure, aborts the read.
pub fn read_jobs<R: io::Read>(source: R, now: NaiveDateTime) -> Result<ParsedJobs, csv::Error> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);

    let headers: StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    let unknown: Vec<&str> = headers
        .iter()
        .filter(|header| !KNOWN_COLUMNS.contains(header))
        .collect();
    if !unknown.is_empty() {
        warn!("Ignoring unrecognized columns: {}", unknown.join(", "));
    }
    let duplicated = duplicated_headers(&headers);
    if !duplicated.is_empty() {
        warn!(
            "Duplicate columns after normalization, first non-blank value wins: {}",
            duplicated.join(", ")
        );
    }

    let mut parsed = ParsedJobs::default();

    for result in reader.records() {
        let record = result?;
        let line = line_of(record.position());
        let row = to_row(&headers, &record);

        match transform_row(row, now) {
            Ok(job) => {
                debug!("Line {}: accepted job {:?} at {:?}", line, job.title, job.company);
                parsed.jobs.push(job);
            }
            Err(reason) => parsed.skipped.push(SkippedRow { line, reason }),
        }
    }

    Ok(parsed)
}

/// Pair cells with headers. A later duplicate column only fills a blank.
fn to_row(headers: &StringRecord, record: &StringRecord) -> Row {
    let mut row = Row::new();
    for (header, cell) in headers.iter().zip(record.iter()) {
        let slot = row.entry(header.to_string()).or_default();
        if slot.trim().is_empty() {
            *slot = cell.to_string();
        }
    }
    row
}

fn duplicated_headers(headers: &StringRecord) -> Vec<&str> {
    let mut duplicated: Vec<&str> = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if headers.iter().take(i).any(|earlier| earlier == header) && !duplicated.contains(&header) {
            duplicated.push(header);
        }
    }
    duplicated
}

/// Derive `date` from the posted time column when present, then build the job.
pub fn transform_row(mut row: Row, now: NaiveDateTime) -> Result<Job, RowError> {
    if let Some(posted) = row.get(POSTED_TIME) {
        let date = posted_time::parse(posted, now)?;
        row.insert("date".to_string(), date.format("%Y-%m-%d").to_string());
    }
    Job::from_row(&row)
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', " ")
}

fn line_of(position: Option<&Position>) -> u64 {
    position.map(Position::line).unwrap_or(0)
}

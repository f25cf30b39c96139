use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

use super::posted_time::PostedTimeError;

/// One CSV data line, keyed by normalized column name
pub type Row = HashMap<String, String>;

/// Columns understood by [`Job::from_row`]
pub const KNOWN_COLUMNS: [&str; 8] = [
    "title",
    "company",
    "location",
    "link",
    "description",
    "applicants",
    "date",
    super::posted_time::POSTED_TIME,
];

/// A validated job listing ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Job {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Company must be between 1 and 255 characters"))]
    pub company: String,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    pub link: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Applicants cannot be negative"))]
    pub applicants: Option<i32>,

    pub date: Option<NaiveDate>,
}

/// Why a row was rejected
#[derive(Debug)]
pub enum RowError {
    /// A mandatory column is absent or blank
    MissingField(&'static str),

    /// The posted time column could not be turned into a date
    PostedTime(PostedTimeError),

    /// A numeric column holds something that is not a number
    InvalidNumber { field: &'static str, value: String },

    /// The date column is not an ISO calendar date
    InvalidDate(String),

    /// The record was built but failed validation
    Invalid(ValidationErrors),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingField(field) => write!(f, "missing required field: {}", field),
            RowError::PostedTime(e) => write!(f, "{}", e),
            RowError::InvalidNumber { field, value } => {
                write!(f, "{} is not a number: {:?}", field, value)
            }
            RowError::InvalidDate(value) => write!(f, "date is not YYYY-MM-DD: {:?}", value),
            RowError::Invalid(errors) => {
                let mut messages: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("Validation error in field: {}", field))
                        })
                    })
                    .collect();
                messages.sort();
                write!(f, "{}", messages.join("; "))
            }
        }
    }
}

impl std::error::Error for RowError {}

impl From<PostedTimeError> for RowError {
    fn from(e: PostedTimeError) -> Self {
        RowError::PostedTime(e)
    }
}

impl Job {
    /// Build a job from a header-mapped row.
    ///
    /// `title` and `company` are mandatory. Blank cells count as absent.
    /// Columns outside [`KNOWN_COLUMNS`] are ignored. Either every field is
    /// valid and a `Job` comes back, or the row is rejected as a whole.
    pub fn from_row(row: &Row) -> Result<Job, RowError> {
        let job = Job {
            title: required(row, "title")?,
            company: required(row, "company")?,
            location: optional(row, "location"),
            link: optional(row, "link"),
            description: optional(row, "description"),
            applicants: optional(row, "applicants")
                .map(|value| parse_applicants(&value))
                .transpose()?,
            date: optional(row, "date")
                .map(|value| {
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| RowError::InvalidDate(value))
                })
                .transpose()?,
        };

        job.validate().map_err(RowError::Invalid)?;
        Ok(job)
    }
}

fn optional(row: &Row, field: &str) -> Option<String> {
    row.get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(row: &Row, field: &'static str) -> Result<String, RowError> {
    optional(row, field).ok_or(RowError::MissingField(field))
}

/// Accepts "1234" and "1,234"; commas must sit between groups of three digits.
fn parse_applicants(value: &str) -> Result<i32, RowError> {
    let invalid = || RowError::InvalidNumber {
        field: "applicants",
        value: value.to_string(),
    };

    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let mut groups = digits.split(',');
    let first = groups.next().unwrap_or_default();
    let rest: Vec<&str> = groups.collect();
    if !rest.is_empty() && (first.is_empty() || first.len() > 3 || rest.iter().any(|g| g.len() != 3)) {
        return Err(invalid());
    }

    let joined = format!("{}{}{}", sign, first, rest.concat());
    if !joined.trim_start_matches('-').chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    joined.parse().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_a_full_record() {
        let job = Job::from_row(&row(&[
            ("title", "Backend Engineer"),
            ("company", "Acme"),
            ("location", " Berlin "),
            ("link", "https://jobs.example.com/42"),
            ("description", "Rust and Postgres"),
            ("applicants", "1,204"),
            ("date", "2024-03-13"),
        ]))
        .unwrap();

        assert_eq!(
            job,
            Job {
                title: "Backend Engineer".to_string(),
                company: "Acme".to_string(),
                location: Some("Berlin".to_string()),
                link: Some("https://jobs.example.com/42".to_string()),
                description: Some("Rust and Postgres".to_string()),
                applicants: Some(1204),
                date: NaiveDate::from_ymd_opt(2024, 3, 13),
            }
        );
    }

    #[test]
    fn optional_fields_may_be_absent_or_blank() {
        let job = Job::from_row(&row(&[
            ("title", "Designer"),
            ("company", "Acme"),
            ("location", "   "),
            ("unrelated", "ignored"),
        ]))
        .unwrap();

        assert_eq!(job.location, None);
        assert_eq!(job.link, None);
        assert_eq!(job.applicants, None);
        assert_eq!(job.date, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = Job::from_row(&row(&[("title", "Designer")])).unwrap_err();
        assert!(matches!(err, RowError::MissingField("company")));

        let err = Job::from_row(&row(&[("title", " "), ("company", "Acme")])).unwrap_err();
        assert!(matches!(err, RowError::MissingField("title")));
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let err = Job::from_row(&row(&[
            ("title", "Designer"),
            ("company", "Acme"),
            ("applicants", "Over 200"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RowError::InvalidNumber { field: "applicants", .. }));

        let err = Job::from_row(&row(&[
            ("title", "Designer"),
            ("company", "Acme"),
            ("date", "13/03/2024"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RowError::InvalidDate(_)));
    }

    #[test]
    fn relative_and_scheme_less_links_are_kept() {
        for link in ["/jobs/42", "www.example.com/job", "https://jobs.example.com/42"] {
            let job = Job::from_row(&row(&[
                ("title", "Designer"),
                ("company", "Acme"),
                ("link", link),
            ]))
            .unwrap();
            assert_eq!(job.link.as_deref(), Some(link));
        }
    }

    #[test]
    fn applicants_accept_only_well_placed_thousands_separators() {
        assert_eq!(parse_applicants("7").unwrap(), 7);
        assert_eq!(parse_applicants("1,204").unwrap(), 1204);
        assert_eq!(parse_applicants("12,345,678").unwrap(), 12345678);

        for value in ["1,,2", "12,34,5", ",123", "1234,567", "1,2345", "12,", "+5", "1 204"] {
            assert!(
                matches!(parse_applicants(value), Err(RowError::InvalidNumber { .. })),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn validation_rules_apply() {
        let long_title = "x".repeat(256);
        let err = Job::from_row(&row(&[
            ("title", long_title.as_str()),
            ("company", "Acme"),
            ("applicants", "-3"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Applicants cannot be negative; Title must be between 1 and 255 characters"
        );
    }
}

use chrono::{Days, Months, NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;

/// Column holding the free-text posting age, e.g. "3 days ago"
pub const POSTED_TIME: &str = "posted time";

const ABSOLUTE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];

/// A posted-time value that could not be turned into a date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedTimeError {
    pub input: String,
}

impl fmt::Display for PostedTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized posted time: {:?}", self.input)
    }
}

impl std::error::Error for PostedTimeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn from_word(word: &str) -> Option<Self> {
        let unit = match word {
            "s" | "sec" | "secs" | "second" | "seconds" => Unit::Second,
            "m" | "min" | "mins" | "minute" | "minutes" => Unit::Minute,
            "h" | "hr" | "hrs" | "hour" | "hours" => Unit::Hour,
            "d" | "day" | "days" => Unit::Day,
            "w" | "wk" | "wks" | "week" | "weeks" => Unit::Week,
            "mo" | "mos" | "month" | "months" => Unit::Month,
            "y" | "yr" | "yrs" | "year" | "years" => Unit::Year,
            _ => return None,
        };
        Some(unit)
    }
}

/// Convert a posted-time string into the calendar date it refers to.
///
/// Relative values ("5 hours ago", "30+ days ago", "an hour ago", "3d ago")
/// are anchored to `now`. Absolute dates ("2024-05-01", "May 1, 2024") are
/// returned as-is. The result depends only on `input` and `now`.
pub fn parse(input: &str, now: NaiveDateTime) -> Result<NaiveDate, PostedTimeError> {
    let error = || PostedTimeError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(error());
    }

    for format in ABSOLUTE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    let lowered = trimmed.to_lowercase();
    let text = lowered
        .strip_prefix("reposted ")
        .or_else(|| lowered.strip_prefix("posted "))
        .unwrap_or(lowered.as_str())
        .trim();

    match text {
        "just now" | "now" | "today" | "moments ago" => return Ok(now.date()),
        "yesterday" => return now.date().checked_sub_days(Days::new(1)).ok_or_else(error),
        _ => {}
    }

    let text = text.strip_suffix("ago").ok_or_else(error)?.trim_end();
    let (amount, unit) = split_amount(text).ok_or_else(error)?;
    subtract(now, amount, unit).ok_or_else(error)
}

/// Split "5 hours", "30+ days", "an hour" or "5h" into amount and unit.
fn split_amount(text: &str) -> Option<(u32, Unit)> {
    let mut words = text.split_whitespace();
    let first = words.next()?;

    let (amount, unit_word) = match words.next() {
        Some(unit_word) => {
            let amount = match first {
                "a" | "an" | "one" => 1,
                digits => parse_count(digits)?,
            };
            (amount, unit_word)
        }
        None => {
            let split = first.find(|c: char| !c.is_ascii_digit() && c != '+')?;
            let (digits, unit_word) = first.split_at(split);
            (parse_count(digits)?, unit_word)
        }
    };

    if words.next().is_some() {
        return None;
    }

    Some((amount, Unit::from_word(unit_word)?))
}

/// "30" or "30+"; the plus marks a lower bound and is dropped.
fn parse_count(raw: &str) -> Option<u32> {
    let digits = raw.strip_suffix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn subtract(now: NaiveDateTime, amount: u32, unit: Unit) -> Option<NaiveDate> {
    let amount_i64 = i64::from(amount);
    let exact = |delta: Option<TimeDelta>| {
        delta
            .and_then(|d| now.checked_sub_signed(d))
            .map(|dt| dt.date())
    };

    match unit {
        Unit::Second => exact(TimeDelta::try_seconds(amount_i64)),
        Unit::Minute => exact(TimeDelta::try_minutes(amount_i64)),
        Unit::Hour => exact(TimeDelta::try_hours(amount_i64)),
        Unit::Day => now.date().checked_sub_days(Days::new(u64::from(amount))),
        Unit::Week => now
            .date()
            .checked_sub_days(Days::new(u64::from(amount) * 7)),
        Unit::Month => now.date().checked_sub_months(Months::new(amount)),
        Unit::Year => now
            .date()
            .checked_sub_months(Months::new(amount.checked_mul(12)?)),
    }
}

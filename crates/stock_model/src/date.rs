use chrono::NaiveDate;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("date too short: {0:?}")]
    TooShort(String),
    #[error("invalid date {raw:?}: {source}")]
    Invalid {
        raw: String,
        source: chrono::ParseError,
    },
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Reduces a timestamp to its calendar day.
///
/// Both the Tiingo API (`2020-01-02T00:00:00.000Z`) and the analyst dataset
/// (`2020-06-05 10:30:54-04:00`) lead with the date, so the first ten
/// characters are kept and everything after them (time of day, zone) is
/// dropped without conversion.
pub fn normalize_date(raw: &str) -> Result<NaiveDate, DateError> {
    let trimmed = raw.trim();
    let day = trimmed
        .get(..DATE_LEN)
        .ok_or_else(|| DateError::TooShort(raw.to_string()))?;

    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|source| DateError::Invalid {
        raw: raw.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateError> {
        if start > end {
            return Err(DateError::InvertedRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

use crate::error::RaincheckError;
use chrono::NaiveDate;

/// An inclusive range of calendar dates with `start <= end`.
///
/// This is the unit of every query: callers build one from user input via
/// [`DateRange::parse`] (which also rejects ranges ending in the future), and
/// the chunker decomposes it into month-aligned sub-ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RaincheckError> {
        if end < start {
            return Err(RaincheckError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings into a validated range.
    ///
    /// On top of the ordering check in [`DateRange::new`], the end date must
    /// not lie after `today`. All checks happen before any network call.
    pub fn parse(start: &str, end: &str, today: NaiveDate) -> Result<Self, RaincheckError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if end > today {
            return Err(RaincheckError::EndDateInFuture { end, today });
        }
        Self::new(start, end)
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, RaincheckError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| RaincheckError::InvalidDateFormat {
        input: input.to_string(),
        source: e,
    })
}

//! Decomposes an arbitrary date range into well-formed upstream requests.
//!
//! Two pure steps: [`chunk_by_month`] splits the range at calendar-month
//! boundaries, and [`classify`] routes each chunk to the archive source, the
//! forecast source, or both (splitting at the lookback boundary). Results are
//! stitched back together with [`merge`], archive before forecast, so the
//! combined series stays in calendar order.
//!
//! Everything here is a pure function of its inputs; "today" is always a
//! parameter, never read from the clock.

use crate::types::daily_series::DailySeries;
use crate::types::date_range::DateRange;
use crate::utils::days_in_month;
use chrono::{Datelike, Duration, NaiveDate};

/// Days of lookback the forecast source is assumed to cover, and past which
/// the archive source is assumed complete. A policy constant: nothing at
/// runtime validates it against actual upstream availability.
pub const FORECAST_LOOKBACK_DAYS: i64 = 5;

/// The upstream routing decision for one month-aligned chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSource {
    /// The whole chunk is served by the historical archive source.
    Archive(DateRange),
    /// The whole chunk is served by the forecast source.
    Forecast(DateRange),
    /// The chunk straddles the lookback boundary and is split in two. The
    /// archive part ends on the boundary day; the forecast part starts the
    /// day after. Every day of the original chunk is covered exactly once.
    Split {
        archive: DateRange,
        forecast: DateRange,
    },
}

/// Splits `range` into per-calendar-month chunks, each clipped to the range.
///
/// A range spanning N calendar months yields exactly N chunks whose spans,
/// concatenated, reconstruct the range with no gaps or overlaps. Always
/// yields at least one chunk.
pub fn chunk_by_month(range: DateRange) -> Vec<DateRange> {
    let mut chunks = Vec::new();
    let mut cursor = range.start;
    while cursor <= range.end {
        let chunk_end = last_day_of_month(cursor).min(range.end);
        chunks.push(DateRange {
            start: cursor,
            end: chunk_end,
        });
        cursor = chunk_end + Duration::days(1);
    }
    chunks
}

/// Routes a chunk to the archive source, the forecast source, or both.
///
/// The boundary day is `today - FORECAST_LOOKBACK_DAYS`. Chunks ending on or
/// before it go to the archive; chunks starting after it go to the forecast;
/// anything straddling it is split, with the boundary day itself on the
/// archive side.
pub fn classify(chunk: DateRange, today: NaiveDate) -> ChunkSource {
    let boundary = today - Duration::days(FORECAST_LOOKBACK_DAYS);
    if chunk.end <= boundary {
        ChunkSource::Archive(chunk)
    } else if chunk.start > boundary {
        ChunkSource::Forecast(chunk)
    } else {
        ChunkSource::Split {
            archive: DateRange {
                start: chunk.start,
                end: boundary,
            },
            forecast: DateRange {
                start: boundary + Duration::days(1),
                end: chunk.end,
            },
        }
    }
}

/// Concatenates per-chunk series in the order given.
///
/// Callers pass parts in calendar order (archive before forecast within a
/// chunk), so the result is chronological by construction. No
/// de-duplication happens here: the chunker never produces overlapping
/// sub-ranges, and merge does not defend against them independently. A part
/// that failed upstream arrives empty and contributes nothing.
pub fn merge<I>(parts: I) -> DailySeries
where
    I: IntoIterator<Item = DailySeries>,
{
    let mut merged = DailySeries::empty();
    for part in parts {
        merged.extend(part);
    }
    merged
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let day = days_in_month(date.year(), date.month()).unwrap_or(date.day());
    NaiveDate::from_ymd_opt(date.year(), date.month(), day).unwrap_or(date)
}

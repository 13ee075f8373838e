use crate::types::date_range::DateRange;
use chrono::NaiveDate;
use serde::Serialize;

/// One day of upstream data. A `None` value means the source reported the
/// date but carried no reading for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// An ordered sequence of daily values, possibly stitched together from
/// several upstream chunks.
///
/// A series only lives for the duration of one query; it is never persisted.
/// Dates are strictly increasing by construction: chunks are concatenated in
/// calendar order and each upstream response is itself ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn new(points: Vec<DailyPoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyPoint> {
        self.points.iter()
    }

    /// Appends all points of `other`, preserving their order.
    pub fn extend(&mut self, other: DailySeries) {
        self.points.extend(other.points);
    }

    /// Whether the series has one point for every day the range covers.
    ///
    /// Sub-chunks that failed upstream contribute no points, so a caller can
    /// detect a degraded result by comparing against the requested range.
    pub fn is_complete_for(&self, range: &DateRange) -> bool {
        self.points.len() as i64 == range.len_days()
    }
}

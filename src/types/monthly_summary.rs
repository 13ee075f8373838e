use crate::types::daily_series::DailySeries;
use serde::Serialize;

/// The memoized aggregate for one (city, year, month) key.
///
/// Derived once from the archive source's daily series and then treated as
/// immutable: the store never overwrites an existing record for the same key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub city: String,
    pub year: i32,
    pub month: u32,
    /// Sum of all reported daily precipitation, in mm. Never negative.
    pub total_precipitation: f64,
    /// Count of days with precipitation strictly above zero.
    pub rainy_days: u32,
    /// Highest reported daily maximum temperature, if any day carried one.
    pub max_temp: Option<f64>,
}

impl MonthlySummary {
    /// Reduces the month's daily precipitation and max-temperature series to
    /// the stored aggregate. Days without a reading are skipped, not counted
    /// as zero.
    pub fn from_daily(
        city: impl Into<String>,
        year: i32,
        month: u32,
        precipitation: &DailySeries,
        max_temps: &DailySeries,
    ) -> Self {
        let total_precipitation = precipitation.iter().filter_map(|p| p.value).sum();
        let max_temp = max_temps
            .iter()
            .filter_map(|p| p.value)
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |m| m.max(v)))
            });
        Self {
            city: city.into(),
            year,
            month,
            total_precipitation,
            rainy_days: rainy_day_count(precipitation),
            max_temp,
        }
    }

    /// The `YYYY-MM` key used in rainfall breakdowns.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Counts days whose reported precipitation is strictly positive.
pub(crate) fn rainy_day_count(precipitation: &DailySeries) -> u32 {
    precipitation
        .iter()
        .filter(|p| p.value.is_some_and(|v| v > 0.0))
        .count() as u32
}

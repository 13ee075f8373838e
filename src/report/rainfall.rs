//! Aggregated rainfall payloads handed to the rendering/web collaborator.

use crate::types::monthly_summary::MonthlySummary;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-month rainy-day breakdown plus running totals over a queried range.
///
/// Keys are `YYYY-MM`, so the map iterates in calendar order. A month whose
/// fetch failed still appears, with a zero count and no contribution to the
/// totals; the gap stays visible instead of aborting the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainfallReport {
    pub monthly_breakdown: BTreeMap<String, u32>,
    pub total_precipitation: f64,
    pub total_rainy_days: u32,
}

impl RainfallReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one month's outcome. `None` marks a month with no data.
    pub fn add_month(&mut self, year: i32, month: u32, summary: Option<&MonthlySummary>) {
        let key = format!("{:04}-{:02}", year, month);
        match summary {
            Some(s) => {
                self.monthly_breakdown.insert(key, s.rainy_days);
                self.total_precipitation += s.total_precipitation;
                self.total_rainy_days += s.rainy_days;
            }
            None => {
                self.monthly_breakdown.insert(key, 0);
            }
        }
    }
}

/// Rainy-day comparison between the current month (so far) and the same
/// calendar month one year earlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainComparison {
    pub city: String,
    pub month: u32,
    pub current_year: i32,
    pub current_rainy_days: u32,
    /// Last day the current-month count covers: today, unless the month is
    /// already complete.
    pub current_through: NaiveDate,
    pub previous_year: i32,
    pub previous_rainy_days: u32,
}

impl RainComparison {
    fn month_name(&self) -> String {
        NaiveDate::from_ymd_opt(self.current_year, self.month, 1)
            .map(|d| d.format("%B").to_string())
            .unwrap_or_else(|| format!("month {}", self.month))
    }
}

impl fmt::Display for RainComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = self.month_name();
        writeln!(
            f,
            "In {} {}, {} had {} days with rain (up to {}).",
            month, self.current_year, self.city, self.current_rainy_days, self.current_through
        )?;
        write!(
            f,
            "In {} {}, there were {} days with rain.",
            month, self.previous_year, self.previous_rainy_days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(city: &str, year: i32, month: u32, precip: f64, rainy: u32) -> MonthlySummary {
        MonthlySummary {
            city: city.to_string(),
            year,
            month,
            total_precipitation: precip,
            rainy_days: rainy,
            max_temp: None,
        }
    }

    #[test]
    fn report_accumulates_across_a_year_boundary() {
        let mut report = RainfallReport::new();
        report.add_month(2023, 11, Some(&summary("perth", 2023, 11, 12.5, 4)));
        report.add_month(2023, 12, Some(&summary("perth", 2023, 12, 0.0, 0)));
        report.add_month(2024, 1, None);
        report.add_month(2024, 2, Some(&summary("perth", 2024, 2, 3.0, 2)));

        let keys: Vec<_> = report.monthly_breakdown.keys().cloned().collect();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(report.monthly_breakdown["2023-11"], 4);
        assert_eq!(report.monthly_breakdown["2024-01"], 0);
        assert_eq!(report.total_precipitation, 15.5);
        assert_eq!(report.total_rainy_days, 6);
    }

    #[test]
    fn comparison_display_names_the_month() {
        let comparison = RainComparison {
            city: "Perth".to_string(),
            month: 3,
            current_year: 2025,
            current_rainy_days: 4,
            current_through: NaiveDate::from_ymd_opt(2025, 3, 27).unwrap(),
            previous_year: 2024,
            previous_rainy_days: 6,
        };
        let text = comparison.to_string();
        assert!(text.contains("March 2025"));
        assert!(text.contains("4 days with rain (up to 2025-03-27)"));
        assert!(text.contains("March 2024"));
        assert!(text.contains("6 days with rain"));
    }
}

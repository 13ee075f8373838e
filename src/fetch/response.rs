//! Typed decoding of the upstream daily-data payload.
//!
//! The source returns a `daily` object holding a `time` array of ISO dates
//! plus one parallel array per requested field. That shape is checked here,
//! at the boundary: a field whose array length disagrees with `time` is a
//! decode error, and nulls survive as `None` rather than being dropped.

use crate::fetch::error::FetchError;
use crate::fetch::open_meteo::DailyField;
use crate::types::daily_series::{DailyPoint, DailySeries};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct DailyResponse {
    pub(crate) daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyBlock {
    pub(crate) time: Vec<NaiveDate>,
    #[serde(default)]
    pub(crate) temperature_2m_max: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub(crate) precipitation_sum: Option<Vec<Option<f64>>>,
}

/// One decoded daily payload, validated against the `time` array.
#[derive(Debug, Clone)]
pub struct DailyData {
    dates: Vec<NaiveDate>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    precipitation_sum: Option<Vec<Option<f64>>>,
}

impl DailyData {
    pub(crate) fn from_response(response: DailyResponse) -> Result<Self, FetchError> {
        let DailyBlock {
            time,
            temperature_2m_max,
            precipitation_sum,
        } = response.daily;
        check_shape(DailyField::Temperature2mMax, time.len(), &temperature_2m_max)?;
        check_shape(DailyField::PrecipitationSum, time.len(), &precipitation_sum)?;
        Ok(Self {
            dates: time,
            temperature_2m_max,
            precipitation_sum,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Zips the `time` array with one field's values into an ordered series.
    pub fn series(&self, field: DailyField) -> Result<DailySeries, FetchError> {
        let values = match field {
            DailyField::Temperature2mMax => &self.temperature_2m_max,
            DailyField::PrecipitationSum => &self.precipitation_sum,
        };
        let values = values.as_ref().ok_or(FetchError::MissingField {
            field: field.api_name(),
        })?;
        Ok(DailySeries::new(
            self.dates
                .iter()
                .zip(values.iter())
                .map(|(date, value)| DailyPoint {
                    date: *date,
                    value: *value,
                })
                .collect(),
        ))
    }
}

fn check_shape(
    field: DailyField,
    expected: usize,
    values: &Option<Vec<Option<f64>>>,
) -> Result<(), FetchError> {
    match values {
        Some(v) if v.len() != expected => Err(FetchError::ShapeMismatch {
            field: field.api_name(),
            expected,
            found: v.len(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<DailyData, FetchError> {
        let response: DailyResponse = serde_json::from_str(json).unwrap();
        DailyData::from_response(response)
    }

    #[test]
    fn decodes_parallel_arrays_preserving_nulls() {
        let data = decode(
            r#"{
                "latitude": -31.95,
                "longitude": 115.86,
                "daily_units": {"time": "iso8601", "temperature_2m_max": "°C"},
                "daily": {
                    "time": ["2024-03-01", "2024-03-02", "2024-03-03"],
                    "temperature_2m_max": [31.2, null, 28.9]
                }
            }"#,
        )
        .unwrap();

        let series = data.series(DailyField::Temperature2mMax).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[0].value, Some(31.2));
        assert_eq!(series.points()[1].value, None);
        assert_eq!(
            series.points()[2].date,
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
    }

    #[test]
    fn length_mismatch_is_rejected_at_the_boundary() {
        let err = decode(
            r#"{
                "daily": {
                    "time": ["2024-03-01", "2024-03-02"],
                    "precipitation_sum": [0.0]
                }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FetchError::ShapeMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn absent_field_errors_on_access_only() {
        let data = decode(
            r#"{
                "daily": {
                    "time": ["2024-03-01"],
                    "temperature_2m_max": [30.0]
                }
            }"#,
        )
        .unwrap();
        assert!(data.series(DailyField::Temperature2mMax).is_ok());
        assert!(matches!(
            data.series(DailyField::PrecipitationSum),
            Err(FetchError::MissingField { .. })
        ));
    }
}

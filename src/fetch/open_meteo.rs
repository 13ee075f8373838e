//! The HTTP layer over the two Open-Meteo endpoint families.
//!
//! One client handles both sources; which one a given sub-range goes to is
//! the chunker's decision, made upstream of this module.

use crate::fetch::error::FetchError;
use crate::fetch::response::{DailyData, DailyResponse};
use crate::locations::LatLon;
use crate::types::date_range::DateRange;
use log::{info, warn};
use reqwest::Client;
use std::fmt;

const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";
const ARCHIVE_BASE_URL: &str = "https://archive-api.open-meteo.com";

/// Timezone sent with every request unless the caller overrides it. All
/// registry cities are Australian.
pub const DEFAULT_TIMEZONE: &str = "Australia/Perth";

/// Which endpoint family a request goes to.
///
/// The archive serves historical values and is assumed complete for dates at
/// least five days old; the forecast serves near-term and future values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Forecast,
    Archive,
}

impl Source {
    fn path(&self) -> &'static str {
        match self {
            Source::Forecast => "/v1/forecast",
            Source::Archive => "/v1/archive",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Forecast => write!(f, "forecast"),
            Source::Archive => write!(f, "archive"),
        }
    }
}

/// A daily variable the upstream source can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyField {
    Temperature2mMax,
    PrecipitationSum,
}

impl DailyField {
    pub(crate) fn api_name(&self) -> &'static str {
        match self {
            DailyField::Temperature2mMax => "temperature_2m_max",
            DailyField::PrecipitationSum => "precipitation_sum",
        }
    }
}

/// HTTP client for the daily-data endpoints.
///
/// Holds one `reqwest::Client`; timeouts are the client's defaults. The base
/// URLs are constructor parameters so tests and proxies can redirect traffic
/// without touching global state.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_base: String,
    archive_base: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_urls(FORECAST_BASE_URL, ARCHIVE_BASE_URL)
    }

    pub fn with_base_urls(
        forecast_base: impl Into<String>,
        archive_base: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            forecast_base: forecast_base.into(),
            archive_base: archive_base.into(),
        }
    }

    /// Fetches daily values for one sub-range from one source.
    ///
    /// A non-success status maps to [`FetchError::HttpStatus`]; whether that
    /// fails the whole query or just leaves a gap is the caller's policy.
    pub async fn fetch_daily(
        &self,
        source: Source,
        coordinate: LatLon,
        range: DateRange,
        fields: &[DailyField],
        timezone: &str,
    ) -> Result<DailyData, FetchError> {
        let url = self.daily_url(source, coordinate, range, fields, timezone);
        info!("fetching {} daily data from {}", source, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        let decoded: DailyResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(url, e))?;
        DailyData::from_response(decoded)
    }

    fn daily_url(
        &self,
        source: Source,
        coordinate: LatLon,
        range: DateRange,
        fields: &[DailyField],
        timezone: &str,
    ) -> String {
        let base = match source {
            Source::Forecast => &self.forecast_base,
            Source::Archive => &self.archive_base,
        };
        let daily = fields
            .iter()
            .map(DailyField::api_name)
            .collect::<Vec<_>>()
            .join(",");
        let mut url = format!(
            "{}{}?latitude={}&longitude={}&daily={}&timezone={}&start_date={}&end_date={}",
            base,
            source.path(),
            coordinate.0,
            coordinate.1,
            daily,
            timezone,
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d"),
        );
        // Temperature-only archive requests pin the reanalysis model.
        if source == Source::Archive && matches!(fields, [DailyField::Temperature2mMax]) {
            url.push_str("&models=era5");
        }
        url
    }
}

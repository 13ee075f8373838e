//! The main entry point for querying weather data.
//!
//! A [`Raincheck`] client answers three kinds of question for a registry
//! city: a daily max-temperature series over an arbitrary date range (split
//! between the archive and forecast sources behind the scenes), a memoized
//! monthly rainfall aggregate, and a rainy-day comparison between the
//! current month and the same month last year.

use crate::chunking::chunker::{chunk_by_month, classify, merge, ChunkSource};
use crate::error::RaincheckError;
use crate::fetch::error::FetchError;
use crate::fetch::open_meteo::{DailyField, OpenMeteoClient, Source, DEFAULT_TIMEZONE};
use crate::locations::{self, City, LatLon};
use crate::report::rainfall::{RainComparison, RainfallReport};
use crate::store::monthly_store::MonthlyStore;
use crate::types::daily_series::DailySeries;
use crate::types::date_range::DateRange;
use crate::types::monthly_summary::{rainy_day_count, MonthlySummary};
use crate::utils::{days_in_month, default_store_path, ensure_parent_dir_exists};
use bon::bon;
use chrono::{Datelike, Local, NaiveDate};
use log::{info, warn};
use std::path::PathBuf;

/// The client. Owns the HTTP layer and the monthly aggregate store; both are
/// configured at construction, not through globals.
///
/// # Examples
///
/// ```no_run
/// # use raincheck::{Raincheck, DateRange, RaincheckError};
/// # async fn run() -> Result<(), RaincheckError> {
/// let client = Raincheck::new().await?;
/// let today = chrono::Local::now().date_naive();
/// let range = DateRange::parse("2024-01-10", "2024-02-20", today)?;
/// let series = client.daily_series().city("perth").range(range).call().await?;
/// for point in series.iter() {
///     println!("{}: {:?}", point.date, point.value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Raincheck {
    fetcher: OpenMeteoClient,
    store: MonthlyStore,
}

#[bon]
impl Raincheck {
    /// Creates a client with the default store location (a `weather.db`
    /// under the user's data directory).
    pub async fn new() -> Result<Self, RaincheckError> {
        let store_path = default_store_path()?;
        Self::with_store_path(store_path).await
    }

    /// Creates a client storing monthly aggregates at `store_path`. The
    /// parent directory is created if missing.
    pub async fn with_store_path(store_path: PathBuf) -> Result<Self, RaincheckError> {
        Self::with_parts(store_path, OpenMeteoClient::new()).await
    }

    /// Full control over both halves: store location and a fetch client,
    /// e.g. one pointed at non-default base URLs.
    pub async fn with_parts(
        store_path: PathBuf,
        fetcher: OpenMeteoClient,
    ) -> Result<Self, RaincheckError> {
        ensure_parent_dir_exists(&store_path).await?;
        let store = MonthlyStore::open(store_path).await?;
        Ok(Self { fetcher, store })
    }

    /// Direct access to the aggregate store, for history listings.
    pub fn store(&self) -> &MonthlyStore {
        &self.store
    }

    /// Fetches the daily max-temperature series for a date range.
    ///
    /// The range is split into calendar-month chunks; each chunk is routed
    /// to the archive or forecast source (or both, when it straddles the
    /// lookback boundary) and the results are concatenated in calendar
    /// order. A sub-chunk that fails upstream is logged and skipped, so the
    /// result may cover fewer days than requested; use
    /// [`DailySeries::is_complete_for`] to detect that.
    ///
    /// # Arguments
    ///
    /// * `.city(&str)`: **Required.** A registry city name, case-insensitive.
    /// * `.range(DateRange)`: **Required.** The dates to cover.
    /// * `.today(NaiveDate)`: Optional. Reference date for the
    ///   archive/forecast boundary; defaults to the local calendar date.
    /// * `.timezone(&str)`: Optional. Upstream timezone parameter; defaults
    ///   to [`DEFAULT_TIMEZONE`].
    #[builder]
    pub async fn daily_series(
        &self,
        city: &str,
        range: DateRange,
        today: Option<NaiveDate>,
        timezone: Option<&str>,
    ) -> Result<DailySeries, RaincheckError> {
        let city = resolve_city(city)?;
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let timezone = timezone.unwrap_or(DEFAULT_TIMEZONE);

        let mut parts = Vec::new();
        for chunk in chunk_by_month(range) {
            match classify(chunk, today) {
                ChunkSource::Archive(sub) => {
                    parts.push(
                        self.daily_part(city.coordinate, sub, Source::Archive, timezone)
                            .await,
                    );
                }
                ChunkSource::Forecast(sub) => {
                    parts.push(
                        self.daily_part(city.coordinate, sub, Source::Forecast, timezone)
                            .await,
                    );
                }
                ChunkSource::Split { archive, forecast } => {
                    parts.push(
                        self.daily_part(city.coordinate, archive, Source::Archive, timezone)
                            .await,
                    );
                    parts.push(
                        self.daily_part(city.coordinate, forecast, Source::Forecast, timezone)
                            .await,
                    );
                }
            }
        }
        Ok(merge(parts))
    }

    /// Fetches one sub-chunk's temperatures. Failures degrade to an empty
    /// part: the gap shows up as missing dates rather than aborting the
    /// whole range.
    async fn daily_part(
        &self,
        coordinate: LatLon,
        range: DateRange,
        source: Source,
        timezone: &str,
    ) -> DailySeries {
        let fetched = self
            .fetcher
            .fetch_daily(
                source,
                coordinate,
                range,
                &[DailyField::Temperature2mMax],
                timezone,
            )
            .await
            .and_then(|data| data.series(DailyField::Temperature2mMax));
        match fetched {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    "skipping {} sub-chunk {}..{}: {}",
                    source, range.start, range.end, e
                );
                DailySeries::empty()
            }
        }
    }

    /// Returns the monthly rainfall aggregate for one (city, year, month),
    /// consulting the store first.
    ///
    /// On a miss the full calendar month is fetched from the archive source,
    /// reduced, and written with insert-if-absent semantics. A failed fetch
    /// stores nothing and propagates; the next call will retry from scratch.
    pub async fn monthly_summary(
        &self,
        city: &str,
        year: i32,
        month: u32,
    ) -> Result<MonthlySummary, RaincheckError> {
        let city = resolve_city(city)?;
        let month_range = full_month_range(year, month)?;

        if let Some(summary) = self.store.lookup(city.key, year, month).await? {
            info!("store hit for {} {:04}-{:02}", city.key, year, month);
            return Ok(summary);
        }

        info!("store miss for {} {:04}-{:02}, fetching", city.key, year, month);
        let data = self
            .fetcher
            .fetch_daily(
                Source::Archive,
                city.coordinate,
                month_range,
                &[DailyField::PrecipitationSum, DailyField::Temperature2mMax],
                DEFAULT_TIMEZONE,
            )
            .await?;
        let precipitation = data.series(DailyField::PrecipitationSum)?;
        let max_temps = data.series(DailyField::Temperature2mMax)?;
        let summary = MonthlySummary::from_daily(city.key, year, month, &precipitation, &max_temps);
        self.store.insert_if_absent(&summary).await?;
        Ok(summary)
    }

    /// Builds the rainfall breakdown for every calendar month overlapping
    /// the range, through the memoized monthly path.
    ///
    /// A month whose fetch fails appears in the breakdown with a zero count
    /// and contributes nothing to the totals; store failures propagate.
    pub async fn rainfall_report(
        &self,
        city: &str,
        range: DateRange,
    ) -> Result<RainfallReport, RaincheckError> {
        resolve_city(city)?;
        let mut report = RainfallReport::new();
        for chunk in chunk_by_month(range) {
            let (year, month) = (chunk.start.year(), chunk.start.month());
            match self.monthly_summary(city, year, month).await {
                Ok(summary) => report.add_month(year, month, Some(&summary)),
                Err(RaincheckError::Fetch(e)) => {
                    warn!("no monthly data for {} {:04}-{:02}: {}", city, year, month, e);
                    report.add_month(year, month, None);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Compares rainy days in the current month (so far) with the same
    /// month one year earlier.
    ///
    /// The two precipitation fetches run concurrently as a two-task
    /// fan-out with no shared state, joined before reducing. Unlike the
    /// daily series, this is all-or-nothing: either fetch failing fails the
    /// comparison.
    ///
    /// # Arguments
    ///
    /// * `.city(&str)`: **Required.** A registry city name.
    /// * `.today(NaiveDate)`: Optional. Defaults to the local calendar date.
    #[builder]
    pub async fn rain_comparison(
        &self,
        city: &str,
        today: Option<NaiveDate>,
    ) -> Result<RainComparison, RaincheckError> {
        let city = resolve_city(city)?;
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let (year, month) = (today.year(), today.month());

        let current = current_month_range(today);
        let previous_year = year - 1;
        let previous = full_month_range(previous_year, month)?;

        let coordinate = city.coordinate;
        let fetcher = self.fetcher.clone();
        let current_task = tokio::spawn(async move {
            fetcher
                .fetch_daily(
                    Source::Archive,
                    coordinate,
                    current,
                    &[DailyField::PrecipitationSum],
                    DEFAULT_TIMEZONE,
                )
                .await
        });
        let fetcher = self.fetcher.clone();
        let previous_task = tokio::spawn(async move {
            fetcher
                .fetch_daily(
                    Source::Archive,
                    coordinate,
                    previous,
                    &[DailyField::PrecipitationSum],
                    DEFAULT_TIMEZONE,
                )
                .await
        });
        let (current_data, previous_data) = tokio::join!(current_task, previous_task);
        let current_data = current_data.map_err(FetchError::from)??;
        let previous_data = previous_data.map_err(FetchError::from)??;

        Ok(RainComparison {
            city: city.display.to_string(),
            month,
            current_year: year,
            current_rainy_days: rainy_day_count(
                &current_data.series(DailyField::PrecipitationSum)?,
            ),
            current_through: current.end,
            previous_year,
            previous_rainy_days: rainy_day_count(
                &previous_data.series(DailyField::PrecipitationSum)?,
            ),
        })
    }
}

fn resolve_city(name: &str) -> Result<&'static City, RaincheckError> {
    locations::resolve(name).ok_or_else(|| RaincheckError::UnknownCity(name.to_string()))
}

fn full_month_range(year: i32, month: u32) -> Result<DateRange, RaincheckError> {
    let last_day = days_in_month(year, month).ok_or(RaincheckError::InvalidMonth(month))?;
    let start =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(RaincheckError::InvalidMonth(month))?;
    let end = NaiveDate::from_ymd_opt(year, month, last_day)
        .ok_or(RaincheckError::InvalidMonth(month))?;
    Ok(DateRange { start, end })
}

/// The stretch of the current month a comparison can cover: the full month
/// once today is its last day, otherwise only through today.
fn current_month_range(today: NaiveDate) -> DateRange {
    let start = today.with_day(1).unwrap_or(today);
    let end = match days_in_month(today.year(), today.month()) {
        Some(last_day) if last_day <= today.day() => today.with_day(last_day).unwrap_or(today),
        _ => today,
    };
    DateRange { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn temp_client() -> (TempDir, Raincheck) {
        let dir = TempDir::new().unwrap();
        let client = Raincheck::with_store_path(dir.path().join("weather.db"))
            .await
            .unwrap();
        (dir, client)
    }

    #[test]
    fn current_month_is_clipped_to_today_mid_month() {
        let range = current_month_range(d(2024, 6, 20));
        assert_eq!(range.start, d(2024, 6, 1));
        assert_eq!(range.end, d(2024, 6, 20));
    }

    #[test]
    fn current_month_is_complete_on_its_last_day() {
        let range = current_month_range(d(2024, 6, 30));
        assert_eq!(range.start, d(2024, 6, 1));
        assert_eq!(range.end, d(2024, 6, 30));
        let range = current_month_range(d(2024, 2, 29));
        assert_eq!(range.end, d(2024, 2, 29));
    }

    #[test]
    fn full_month_range_uses_true_calendar_length() {
        let range = full_month_range(2024, 2).unwrap();
        assert_eq!(range.start, d(2024, 2, 1));
        assert_eq!(range.end, d(2024, 2, 29));
        assert!(matches!(
            full_month_range(2024, 13),
            Err(RaincheckError::InvalidMonth(13))
        ));
    }

    #[tokio::test]
    async fn unknown_city_is_rejected_before_any_fetch() {
        let (_dir, client) = temp_client().await;
        let range = DateRange::new(d(2024, 3, 1), d(2024, 3, 5)).unwrap();
        let err = client
            .daily_series()
            .city("auckland")
            .range(range)
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, RaincheckError::UnknownCity(_)));

        let err = client.monthly_summary("gotham", 2024, 3).await.unwrap_err();
        assert!(matches!(err, RaincheckError::UnknownCity(_)));
    }

    #[tokio::test]
    async fn monthly_summary_prefers_the_store() {
        let (_dir, client) = temp_client().await;
        // Seed the store directly; the fetch path must not run at all, so
        // even a bogus upstream value comes back verbatim.
        let seeded = MonthlySummary {
            city: "perth".to_string(),
            year: 2024,
            month: 3,
            total_precipitation: 42.0,
            rainy_days: 7,
            max_temp: Some(33.3),
        };
        client.store().insert_if_absent(&seeded).await.unwrap();

        let summary = client.monthly_summary("Perth", 2024, 3).await.unwrap();
        assert_eq!(summary, seeded);
    }

    // Exercises the real Open-Meteo archive; run explicitly with
    // `cargo test -- --ignored` when network access is available.
    #[tokio::test]
    #[ignore]
    async fn daily_series_covers_an_archived_range() {
        let (_dir, client) = temp_client().await;
        let range = DateRange::new(d(2024, 1, 10), d(2024, 2, 20)).unwrap();
        let series = client
            .daily_series()
            .city("perth")
            .range(range)
            .today(d(2024, 6, 1))
            .call()
            .await
            .unwrap();
        assert!(series.is_complete_for(&range));
        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[tokio::test]
    #[ignore]
    async fn monthly_summary_memoizes_the_first_fetch() {
        let (_dir, client) = temp_client().await;
        let first = client.monthly_summary("perth", 2024, 3).await.unwrap();
        assert!(first.total_precipitation >= 0.0);
        let second = client.monthly_summary("perth", 2024, 3).await.unwrap();
        assert_eq!(first, second);
    }
}

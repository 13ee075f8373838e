mod chunking;
mod error;
mod fetch;
mod locations;
mod raincheck;
mod report;
mod store;
mod types;
mod utils;

pub use error::RaincheckError;
pub use raincheck::*;

pub use chunking::chunker::{chunk_by_month, classify, merge, ChunkSource, FORECAST_LOOKBACK_DAYS};

pub use fetch::error::FetchError;
pub use fetch::open_meteo::{DailyField, OpenMeteoClient, Source, DEFAULT_TIMEZONE};
pub use fetch::response::DailyData;

pub use store::error::StoreError;
pub use store::monthly_store::MonthlyStore;

pub use locations::{city_names, resolve, City, LatLon, CITY_REGISTRY};

pub use types::daily_series::{DailyPoint, DailySeries};
pub use types::date_range::DateRange;
pub use types::monthly_summary::MonthlySummary;

pub use report::chart::{render_base64, render_svg};
pub use report::rainfall::{RainComparison, RainfallReport};

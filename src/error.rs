use crate::fetch::error::FetchError;
use crate::store::error::StoreError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaincheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unknown city '{0}', expected one of the registry cities")]
    UnknownCity(String),

    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDateFormat {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} is in the future (today is {today})")]
    EndDateInFuture { end: NaiveDate, today: NaiveDate },

    #[error("Month {0} is out of range (1-12)")]
    InvalidMonth(u32),

    #[error("Failed to determine a data directory for the monthly store")]
    DataDirResolution,

    #[error("Failed to create store directory '{0}'")]
    StoreDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to render chart: {0}")]
    ChartRender(String),
}

use crate::error::RaincheckError;
use chrono::{Datelike, Duration, NaiveDate};
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "raincheck";
const STORE_FILE_NAME: &str = "weather.db";

pub(crate) fn default_store_path() -> Result<PathBuf, RaincheckError> {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME).join(STORE_FILE_NAME))
        .ok_or(RaincheckError::DataDirResolution)
}

pub(crate) async fn ensure_parent_dir_exists(path: &Path) -> Result<(), RaincheckError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    match tokio::fs::metadata(parent).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(RaincheckError::StoreDirCreation(
            parent.to_path_buf(),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RaincheckError::StoreDirCreation(parent.to_path_buf(), e)),
        Err(e) => Err(RaincheckError::StoreDirCreation(parent.to_path_buf(), e)),
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_month_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_day_of_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day_of_current_month = first_day_of_next_month - Duration::days(1);
    Some(last_day_of_current_month.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
    }

    #[test]
    fn invalid_month_is_none() {
        assert_eq!(days_in_month(2024, 0), None);
        assert_eq!(days_in_month(2024, 13), None);
    }
}

//! SQLite-backed store of monthly weather aggregates.
//!
//! Each (city, year, month) key is written at most once: writes go through
//! `INSERT OR IGNORE`, so the first stored value wins and later writes for
//! the same key are silently dropped. Records never expire and are never
//! refreshed.
//!
//! Every operation opens its own connection and closes it on return, even on
//! error paths; no connection is held across requests. The blocking SQLite
//! work runs on the blocking thread pool.

use crate::store::error::StoreError;
use crate::types::monthly_summary::MonthlySummary;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tokio::task;

pub struct MonthlyStore {
    db_path: PathBuf,
}

impl MonthlyStore {
    /// Opens the store at `db_path`, creating the schema if it is missing.
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.into(),
        };
        let path = store.db_path.clone();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            conn.execute(
                "CREATE TABLE IF NOT EXISTS weather_data (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    city TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    total_precipitation REAL NOT NULL,
                    rainy_days INTEGER NOT NULL,
                    max_temp REAL,
                    UNIQUE (city, year, month)
                )",
                [],
            )?;
            Ok::<(), StoreError>(())
        })
        .await??;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Point lookup by exact key. `None` means the month was never fetched
    /// successfully.
    pub async fn lookup(
        &self,
        city: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlySummary>, StoreError> {
        let path = self.db_path.clone();
        let city = city.to_string();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let summary = conn
                .query_row(
                    "SELECT city, year, month, total_precipitation, rainy_days, max_temp
                     FROM weather_data
                     WHERE city = ?1 AND year = ?2 AND month = ?3",
                    params![city, year, month],
                    row_to_summary,
                )
                .optional()?;
            Ok(summary)
        })
        .await?
    }

    /// Inserts a summary unless its key already has a record. Returns whether
    /// a row was actually written; `false` means an earlier record won.
    pub async fn insert_if_absent(&self, summary: &MonthlySummary) -> Result<bool, StoreError> {
        let path = self.db_path.clone();
        let summary = summary.clone();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let changed = conn.execute(
                "INSERT OR IGNORE INTO weather_data
                     (city, year, month, total_precipitation, rainy_days, max_temp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    summary.city,
                    summary.year,
                    summary.month,
                    summary.total_precipitation,
                    summary.rainy_days,
                    summary.max_temp,
                ],
            )?;
            if changed == 0 {
                info!(
                    "keeping existing record for {} {}",
                    summary.city,
                    summary.month_key()
                );
            }
            Ok(changed > 0)
        })
        .await?
    }

    /// All stored records, newest month first, optionally for one city.
    pub async fn history(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<MonthlySummary>, StoreError> {
        let path = self.db_path.clone();
        let city = city.map(str::to_string);
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let rows = match city {
                Some(city) => {
                    let mut stmt = conn.prepare(
                        "SELECT city, year, month, total_precipitation, rainy_days, max_temp
                         FROM weather_data
                         WHERE city = ?1
                         ORDER BY year DESC, month DESC",
                    )?;
                    let rows = stmt
                        .query_map(params![city], row_to_summary)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT city, year, month, total_precipitation, rainy_days, max_temp
                         FROM weather_data
                         ORDER BY year DESC, month DESC",
                    )?;
                    let rows = stmt
                        .query_map([], row_to_summary)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
        .await?
    }

    /// Distinct cities with at least one stored record, alphabetically.
    pub async fn cities(&self) -> Result<Vec<String>, StoreError> {
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let mut stmt =
                conn.prepare("SELECT DISTINCT city FROM weather_data ORDER BY city")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?
    }
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<MonthlySummary> {
    Ok(MonthlySummary {
        city: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        total_precipitation: row.get(3)?,
        rainy_days: row.get(4)?,
        max_temp: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_series::{DailyPoint, DailySeries};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn open_temp_store() -> (TempDir, MonthlyStore) {
        let dir = TempDir::new().unwrap();
        let store = MonthlyStore::open(dir.path().join("weather.db"))
            .await
            .unwrap();
        (dir, store)
    }

    fn summary(city: &str, year: i32, month: u32, precip: f64, rainy: u32) -> MonthlySummary {
        MonthlySummary {
            city: city.to_string(),
            year,
            month,
            total_precipitation: precip,
            rainy_days: rainy,
            max_temp: Some(25.0),
        }
    }

    #[tokio::test]
    async fn lookup_misses_then_hits_after_insert() {
        let (_dir, store) = open_temp_store().await;
        assert!(store.lookup("perth", 2024, 3).await.unwrap().is_none());

        let record = summary("perth", 2024, 3, 2.5, 1);
        assert!(store.insert_if_absent(&record).await.unwrap());

        let found = store.lookup("perth", 2024, 3).await.unwrap().unwrap();
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn fetched_month_reduces_and_round_trips() {
        let (_dir, store) = open_temp_store().await;
        assert!(store.lookup("perth", 2024, 3).await.unwrap().is_none());

        let daily = |values: &[f64]| {
            DailySeries::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| DailyPoint {
                        date: NaiveDate::from_ymd_opt(2024, 3, i as u32 + 1).unwrap(),
                        value: Some(*v),
                    })
                    .collect(),
            )
        };
        let record = MonthlySummary::from_daily(
            "perth",
            2024,
            3,
            &daily(&[0.0, 2.5, 0.0, 0.0]),
            &daily(&[20.0, 22.0, 19.0, 25.0]),
        );
        store.insert_if_absent(&record).await.unwrap();

        let found = store.lookup("perth", 2024, 3).await.unwrap().unwrap();
        assert_eq!(found.total_precipitation, 2.5);
        assert_eq!(found.rainy_days, 1);
        assert_eq!(found.max_temp, Some(25.0));
    }

    #[tokio::test]
    async fn first_write_wins() {
        let (_dir, store) = open_temp_store().await;
        let first = summary("perth", 2024, 3, 2.5, 1);
        let second = summary("perth", 2024, 3, 99.0, 30);

        assert!(store.insert_if_absent(&first).await.unwrap());
        assert!(!store.insert_if_absent(&second).await.unwrap());

        let found = store.lookup("perth", 2024, 3).await.unwrap().unwrap();
        assert_eq!(found, first);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_filterable() {
        let (_dir, store) = open_temp_store().await;
        store
            .insert_if_absent(&summary("perth", 2023, 5, 10.0, 4))
            .await
            .unwrap();
        store
            .insert_if_absent(&summary("perth", 2024, 3, 2.5, 1))
            .await
            .unwrap();
        store
            .insert_if_absent(&summary("sydney", 2024, 1, 7.0, 3))
            .await
            .unwrap();

        let all = store.history(None).await.unwrap();
        let keys: Vec<_> = all.iter().map(MonthlySummary::month_key).collect();
        assert_eq!(keys, vec!["2024-03", "2024-01", "2023-05"]);

        let perth_only = store.history(Some("perth")).await.unwrap();
        assert_eq!(perth_only.len(), 2);
        assert!(perth_only.iter().all(|s| s.city == "perth"));
    }

    #[tokio::test]
    async fn cities_are_distinct_and_sorted() {
        let (_dir, store) = open_temp_store().await;
        store
            .insert_if_absent(&summary("sydney", 2024, 1, 7.0, 3))
            .await
            .unwrap();
        store
            .insert_if_absent(&summary("perth", 2024, 1, 1.0, 1))
            .await
            .unwrap();
        store
            .insert_if_absent(&summary("perth", 2024, 2, 2.0, 2))
            .await
            .unwrap();

        assert_eq!(store.cities().await.unwrap(), vec!["perth", "sydney"]);
    }

    #[tokio::test]
    async fn null_max_temp_round_trips() {
        let (_dir, store) = open_temp_store().await;
        let record = MonthlySummary {
            max_temp: None,
            ..summary("adelaide", 2022, 6, 40.2, 12)
        };
        store.insert_if_absent(&record).await.unwrap();
        let found = store.lookup("adelaide", 2022, 6).await.unwrap().unwrap();
        assert_eq!(found.max_temp, None);
    }
}

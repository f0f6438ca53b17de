//! CSV loading functions for seeding the database.
//!
//! Each loader parses CSV data from a string slice and inserts rows into
//! the corresponding table, replacing rows with the same key.
//!
//! # CSV Formats
//!
//! - **Resorts** (has headers): `id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m`
//! - **Courses** (has headers): `resort_id,name,length_km`
//! - **Peaks** (has headers): `resort_id,start,end,avg_snowfall_cm` with `MM-DD` bounds
//! - **Snowfall** (no headers): `resort_id,date(YYYY-MM-DD),snowfall_cm`
//!
//! Blank or non-numeric optional columns are stored as NULL.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rusqlite::params;
use snowfinder_core::MonthDay;

use crate::{Database, DbError, Result};

/// File names looked up by [`Database::load_dir`].
pub const RESORTS_FILE: &str = "resorts.csv";
pub const COURSES_FILE: &str = "courses.csv";
pub const PEAKS_FILE: &str = "peaks.csv";
pub const SNOWFALL_FILE: &str = "snowfall.csv";

fn text<'r>(r: &'r StringRecord, idx: usize) -> &'r str {
    r.get(idx).unwrap_or("").trim()
}

fn optional<T: FromStr>(r: &StringRecord, idx: usize) -> Option<T> {
    r.get(idx).and_then(|s| s.trim().parse().ok())
}

fn reader(csv_data: &str, has_headers: bool) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(csv_data.as_bytes())
}

impl Database {
    /// Load resort metadata from CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m
    /// hakuba-happo,Hakuba Happo-one,nagano,1831,760,1071
    /// ```
    pub fn load_resorts(&self, csv_data: &str) -> Result<()> {
        let conn = self.connection()?;
        let mut rdr = reader(csv_data, true);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let id = text(&r, 0);
            let name = text(&r, 1);
            if id.is_empty() || name.is_empty() {
                return Err(DbError::InvalidRecord(format!(
                    "resort row {:?} needs an id and a name",
                    r
                )));
            }
            let prefecture = text(&r, 2);
            let top: Option<i64> = optional(&r, 3);
            let base: Option<i64> = optional(&r, 4);
            let vertical: Option<i64> = optional(&r, 5);

            conn.execute(
                "INSERT OR REPLACE INTO resorts
                 (id, name, prefecture, top_elevation_m, base_elevation_m, vertical_m)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, name, prefecture, top, base, vertical],
            )?;
            count += 1;
        }
        log::info!("[snowfinder] loader: Loaded {} resorts", count);
        Ok(())
    }

    /// Load course data from CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// resort_id,name,length_km
    /// hakuba-happo,Kokusai,2.1
    /// ```
    pub fn load_courses(&self, csv_data: &str) -> Result<()> {
        let conn = self.connection()?;
        let mut rdr = reader(csv_data, true);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let resort_id = text(&r, 0);
            let name = text(&r, 1);
            if resort_id.is_empty() || name.is_empty() {
                skipped += 1;
                continue;
            }
            let length_km: Option<f64> = optional(&r, 2);

            conn.execute(
                "INSERT OR REPLACE INTO courses (resort_id, name, length_km)
                 VALUES (?1, ?2, ?3)",
                params![resort_id, name, length_km],
            )?;
            count += 1;
        }
        log::info!("[snowfinder] loader: Loaded {} courses, skipped {} invalid", count, skipped);
        Ok(())
    }

    /// Load peak periods from CSV string.
    ///
    /// Both bounds must be valid `MM-DD` values; a bad bound fails the load.
    ///
    /// # Example CSV
    /// ```text
    /// resort_id,start,end,avg_snowfall_cm
    /// hakuba-happo,12-28,01-10,180
    /// ```
    pub fn load_peaks(&self, csv_data: &str) -> Result<()> {
        let conn = self.connection()?;
        let mut rdr = reader(csv_data, true);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let resort_id = text(&r, 0);
            let start = MonthDay::parse(text(&r, 1))
                .map_err(|e| DbError::InvalidRecord(format!("peak start for {}: {}", resort_id, e)))?;
            let end = MonthDay::parse(text(&r, 2))
                .map_err(|e| DbError::InvalidRecord(format!("peak end for {}: {}", resort_id, e)))?;
            let avg: Option<i64> = optional(&r, 3);

            conn.execute(
                "INSERT OR REPLACE INTO peak_periods (resort_id, start_md, end_md, avg_snowfall_cm)
                 VALUES (?1, ?2, ?3, ?4)",
                params![resort_id, start.to_string(), end.to_string(), avg],
            )?;
            count += 1;
        }
        log::info!("[snowfinder] loader: Loaded {} peak periods", count);
        Ok(())
    }

    /// Load snowfall observations from CSV string.
    ///
    /// Expected format (no headers): `resort_id,date(YYYY-MM-DD),snowfall_cm`
    ///
    /// A blank or non-numeric snowfall is stored as NULL so the day still
    /// counts as reported. Rows with an empty id or an unparsable date are
    /// skipped.
    ///
    /// # Example CSV
    /// ```text
    /// hakuba-happo,2023-02-08,35
    /// hakuba-happo,2023-02-09,
    /// ```
    pub fn load_snowfall(&self, csv_data: &str) -> Result<()> {
        let conn = self.connection()?;
        let tx = conn.unchecked_transaction()?;
        let mut rdr = reader(csv_data, false);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let resort_id = text(&r, 0);
            let date = match NaiveDate::parse_from_str(text(&r, 1), "%Y-%m-%d") {
                Ok(d) => d,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            if resort_id.is_empty() {
                skipped += 1;
                continue;
            }
            let snowfall: Option<i64> = optional(&r, 2);

            tx.execute(
                "INSERT OR REPLACE INTO snowfall_observations (resort_id, date, snowfall_cm)
                 VALUES (?1, ?2, ?3)",
                params![resort_id, date.format("%Y-%m-%d").to_string(), snowfall],
            )?;
            count += 1;
        }
        tx.commit()?;
        log::info!(
            "[snowfinder] loader: Loaded {} snowfall observations, skipped {} invalid",
            count,
            skipped
        );
        Ok(())
    }

    /// Load every seed file present in `dir`.
    ///
    /// Missing files are skipped; the order guarantees resorts exist before
    /// rows that refer to them.
    pub fn load_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        let loaders: [(&str, fn(&Database, &str) -> Result<()>); 4] = [
            (RESORTS_FILE, Database::load_resorts),
            (COURSES_FILE, Database::load_courses),
            (PEAKS_FILE, Database::load_peaks),
            (SNOWFALL_FILE, Database::load_snowfall),
        ];
        for (file, load) in loaders {
            let path = dir.join(file);
            if !path.exists() {
                log::warn!("[snowfinder] loader: {} not found, skipping", path.display());
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            load(self, &data)?;
        }
        Ok(())
    }
}

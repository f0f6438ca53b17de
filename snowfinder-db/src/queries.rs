//! Typed query methods backing the ranking and metadata endpoints.
//!
//! # Seasonal aggregation
//!
//! A ranking query takes a [`CalendarWindow`] and aggregates every resort's
//! snowfall observations that fall inside it:
//!
//! 1. An observation qualifies when its reading is non-null and its
//!    month-day is inside the window. Wrapping windows (`12-28..01-05`)
//!    match `md >= start OR md <= end`.
//! 2. Qualifying observations are grouped by season. A non-wrapping window
//!    occurs once per calendar year; for a wrapping window the January
//!    tail belongs to the season that began the previous December.
//! 3. Each season's readings are summed. A resort's `total_snowfall_cm` is
//!    the mean of its season sums, rounded to whole centimetres, over the
//!    seasons that had data. `years_with_data` counts those seasons.
//! 4. Resorts without any qualifying season are left out.
//! 5. Rows are ordered by `total_snowfall_cm DESC, years_with_data DESC,
//!    name ASC` and cut to the limit.

use rusqlite::{named_params, params, Row};
use snowfinder_core::{
    AggregationRow, CalendarWindow, MonthDay, PeakPeriod, ResortRecord, ResortWithPeaks,
};

use crate::{Database, DbError, Result};

const RANK_BY_WINDOW_SQL: &str = "
    WITH matched AS (
        SELECT o.resort_id,
               CASE
                   WHEN :start > :end AND substr(o.date, 6, 5) <= :end
                       THEN CAST(substr(o.date, 1, 4) AS INTEGER) - 1
                   ELSE CAST(substr(o.date, 1, 4) AS INTEGER)
               END AS season,
               o.snowfall_cm
        FROM snowfall_observations o
        WHERE o.snowfall_cm IS NOT NULL
          AND CASE
                  WHEN :start <= :end
                      THEN substr(o.date, 6, 5) BETWEEN :start AND :end
                  ELSE substr(o.date, 6, 5) >= :start OR substr(o.date, 6, 5) <= :end
              END
    ),
    seasonal AS (
        SELECT resort_id, season, SUM(snowfall_cm) AS season_total
        FROM matched
        GROUP BY resort_id, season
    ),
    per_resort AS (
        SELECT resort_id,
               CAST(ROUND(AVG(season_total)) AS INTEGER) AS avg_total,
               COUNT(*) AS seasons
        FROM seasonal
        GROUP BY resort_id
    ),
    course_stats AS (
        SELECT resort_id, COUNT(*) AS num_courses, MAX(length_km) AS longest_km
        FROM courses
        GROUP BY resort_id
    )
    SELECT r.name, r.prefecture, p.avg_total, p.seasons,
           r.top_elevation_m, r.base_elevation_m, r.vertical_m,
           c.num_courses, c.longest_km
    FROM per_resort p
    INNER JOIN resorts r ON r.id = p.resort_id
    LEFT JOIN course_stats c ON c.resort_id = r.id
    WHERE :region IS NULL OR r.prefecture = :region
    ORDER BY p.avg_total DESC, p.seasons DESC, r.name ASC
    LIMIT :limit";

fn aggregation_row(row: &Row<'_>) -> rusqlite::Result<AggregationRow> {
    Ok(AggregationRow {
        resort_name: row.get(0)?,
        region: row.get(1)?,
        total_snowfall_cm: row.get(2)?,
        years_with_data: row.get(3)?,
        top_elevation_m: row.get(4)?,
        base_elevation_m: row.get(5)?,
        vertical_drop_m: row.get(6)?,
        num_courses: row.get(7)?,
        longest_course_km: row.get(8)?,
    })
}

fn resort_record(row: &Row<'_>) -> rusqlite::Result<ResortRecord> {
    Ok(ResortRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        region: row.get(2)?,
    })
}

/// Read a stored `MM-DD` column, reporting corruption as a conversion error.
fn month_day_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<MonthDay> {
    let raw: String = row.get(idx)?;
    MonthDay::parse(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl Database {
    // ───────────────────── Ranking Queries ─────────────────────

    /// Rank all resorts by average snowfall inside `window`, best first.
    pub fn rank_by_window(
        &self,
        window: &CalendarWindow,
        limit: usize,
    ) -> Result<Vec<AggregationRow>> {
        self.rank(window, None, limit)
    }

    /// Same as [`rank_by_window`](Self::rank_by_window), restricted to
    /// resorts whose prefecture equals `region` exactly.
    pub fn rank_by_window_and_region(
        &self,
        window: &CalendarWindow,
        region: &str,
        limit: usize,
    ) -> Result<Vec<AggregationRow>> {
        self.rank(window, Some(region), limit)
    }

    fn rank(
        &self,
        window: &CalendarWindow,
        region: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AggregationRow>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let start = window.start().to_string();
        let end = window.end().to_string();

        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(RANK_BY_WINDOW_SQL)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":start": start,
                    ":end": end,
                    ":region": region,
                    ":limit": limit,
                },
                aggregation_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::info!(
            "[snowfinder] query: rank window={} region={} returned {} rows",
            window,
            region.unwrap_or("all"),
            rows.len()
        );
        Ok(rows)
    }

    // ───────────────────── Metadata Queries ─────────────────────

    /// Look up one resort. `Ok(None)` means the id does not exist.
    pub fn resort_by_id(&self, id: &str) -> Result<Option<ResortRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached("SELECT id, name, prefecture FROM resorts WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], resort_record)?;
        let resort = rows.next().transpose()?;
        log::info!(
            "[snowfinder] query: resort_by_id({}) found={}",
            id,
            resort.is_some()
        );
        Ok(resort)
    }

    /// Peak periods for one resort, ordered by start.
    pub fn peak_periods_for_resort(&self, resort_id: &str) -> Result<Vec<PeakPeriod>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(
            "SELECT start_md, end_md, avg_snowfall_cm FROM peak_periods
             WHERE resort_id = ?1
             ORDER BY start_md",
        )?;
        let peaks = stmt
            .query_map(params![resort_id], |row| {
                Ok(PeakPeriod {
                    start_date: month_day_column(row, 0)?,
                    end_date: month_day_column(row, 1)?,
                    avg_snowfall_cm: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::info!(
            "[snowfinder] query: peak_periods_for_resort({}) returned {} records",
            resort_id,
            peaks.len()
        );
        Ok(peaks)
    }

    /// Every resort with its peak periods, resorts ordered by name.
    pub fn all_resorts_with_peaks(&self) -> Result<Vec<ResortWithPeaks>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.name, r.prefecture, p.start_md, p.end_md, p.avg_snowfall_cm
             FROM resorts r
             LEFT JOIN peak_periods p ON p.resort_id = r.id
             ORDER BY r.name, r.id, p.start_md",
        )?;
        let mut rows = stmt.query([])?;

        let mut results: Vec<ResortWithPeaks> = Vec::new();
        while let Some(row) = rows.next()? {
            let resort = resort_record(row)?;
            let start: Option<String> = row.get(3)?;
            if results.last().map(|last| last.resort.id != resort.id).unwrap_or(true) {
                results.push(ResortWithPeaks {
                    resort,
                    peaks: Vec::new(),
                });
            }
            if start.is_some() {
                let peak = PeakPeriod {
                    start_date: month_day_column(row, 3)?,
                    end_date: month_day_column(row, 4)?,
                    avg_snowfall_cm: row.get(5)?,
                };
                if let Some(last) = results.last_mut() {
                    last.peaks.push(peak);
                }
            }
        }
        log::info!(
            "[snowfinder] query: all_resorts_with_peaks returned {} resorts",
            results.len()
        );
        Ok(results)
    }

    /// Earliest and latest observation dates, if any data is loaded.
    pub fn observation_date_range(&self) -> Result<Option<(String, String)>> {
        let conn = self.connection()?;
        let range: (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(date), MAX(date) FROM snowfall_observations",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        match range {
            (Some(min), Some(max)) => Ok(Some((min, max))),
            (None, None) => Ok(None),
            _ => Err(DbError::InvalidRecord("partial observation date range".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{Datelike, NaiveDate};
    use std::collections::BTreeMap;

    fn md(s: &str) -> MonthDay {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> CalendarWindow {
        CalendarWindow::normalize(md(start), Some(md(end)))
    }

    /// Three resorts across two prefectures, two seasons of February data,
    /// plus a New Year stretch for wraparound checks.
    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_resorts(
            "\
id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m
hakuba,Hakuba Happo-one,nagano,1831,760,1071
nozawa,Nozawa Onsen,nagano,1650,565,1085
niseko,Niseko United,hokkaido,1308,260,
",
        )
        .unwrap();
        db.load_courses(
            "\
resort_id,name,length_km
hakuba,Kokusai,2.1
hakuba,Skyline,3.4
nozawa,Schneider,
",
        )
        .unwrap();
        db.load_peaks(
            "\
resort_id,start,end,avg_snowfall_cm
hakuba,12-28,01-10,180
hakuba,02-01,02-20,150
niseko,01-15,02-15,
",
        )
        .unwrap();
        db.load_snowfall(
            "\
hakuba,2022-02-08,100
hakuba,2022-02-10,60
hakuba,2023-02-09,80
hakuba,2023-02-20,500
nozawa,2022-02-12,120
nozawa,2023-02-12,
niseko,2022-02-09,150
niseko,2023-02-09,170
niseko,2024-02-14,130
hakuba,2022-12-30,40
hakuba,2023-01-03,25
hakuba,2023-12-29,10
niseko,2023-01-04,90
niseko,2023-06-15,999
",
        )
        .unwrap();
        db
    }

    // ───────────────────── Ranking ─────────────────────

    #[test]
    fn rank_averages_over_seasons_with_data() {
        let db = sample_db();
        let rows = db.rank_by_window(&window("02-08", "02-14"), 10).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.resort_name.as_str()).collect();
        // niseko: (150 + 170 + 130) / 3 = 150
        // nozawa: 2022 = 120, 2023 only NULL -> one season, 120
        // hakuba: 2022 = 160, 2023 = 80 (02-20 outside) -> 120, two seasons
        assert_eq!(names, vec!["Niseko United", "Hakuba Happo-one", "Nozawa Onsen"]);
        assert_eq!(rows[0].total_snowfall_cm, Some(150));
        assert_eq!(rows[0].years_with_data, Some(3));
        assert_eq!(rows[1].total_snowfall_cm, Some(120));
        assert_eq!(rows[1].years_with_data, Some(2));
        assert_eq!(rows[2].total_snowfall_cm, Some(120));
        assert_eq!(rows[2].years_with_data, Some(1));
    }

    #[test]
    fn rank_keeps_missing_metrics_null() {
        let db = sample_db();
        let rows = db.rank_by_window(&window("02-08", "02-14"), 10).unwrap();
        let niseko = rows.iter().find(|r| r.resort_name == "Niseko United").unwrap();
        assert_eq!(niseko.vertical_drop_m, None);
        assert_eq!(niseko.num_courses, None);
        assert_eq!(niseko.longest_course_km, None);
        assert_eq!(niseko.top_elevation_m, Some(1308));

        let nozawa = rows.iter().find(|r| r.resort_name == "Nozawa Onsen").unwrap();
        assert_eq!(nozawa.num_courses, Some(1));
        assert_eq!(nozawa.longest_course_km, None);

        let hakuba = rows.iter().find(|r| r.resort_name == "Hakuba Happo-one").unwrap();
        assert_eq!(hakuba.num_courses, Some(2));
        assert_eq!(hakuba.longest_course_km, Some(3.4));
    }

    #[test]
    fn rank_respects_limit() {
        let db = sample_db();
        let rows = db.rank_by_window(&window("02-08", "02-14"), 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].resort_name, "Niseko United");
    }

    #[test]
    fn rank_by_region_is_exact_match() {
        let db = sample_db();
        let w = window("02-08", "02-14");
        let nagano = db.rank_by_window_and_region(&w, "nagano", 10).unwrap();
        assert_eq!(nagano.len(), 2);
        assert!(nagano.iter().all(|r| r.region == "nagano"));

        assert!(db.rank_by_window_and_region(&w, "Nagano", 10).unwrap().is_empty());
        assert!(db.rank_by_window_and_region(&w, "all", 10).unwrap().is_empty());
    }

    #[test]
    fn rank_wrapping_window_groups_new_year_into_one_season() {
        let db = sample_db();
        let rows = db.rank_by_window(&window("12-28", "01-05"), 10).unwrap();
        // hakuba: season 2022 = 40 + 25 = 65, season 2023 = 10 -> avg 37.5 -> 38
        // niseko: season 2022 = 90
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].resort_name, "Niseko United");
        assert_eq!(rows[0].total_snowfall_cm, Some(90));
        assert_eq!(rows[0].years_with_data, Some(1));
        assert_eq!(rows[1].resort_name, "Hakuba Happo-one");
        assert_eq!(rows[1].total_snowfall_cm, Some(38));
        assert_eq!(rows[1].years_with_data, Some(2));
    }

    #[test]
    fn rank_single_day_window() {
        let db = sample_db();
        let w = CalendarWindow::normalize(md("02-09"), None);
        let rows = db.rank_by_window(&w, 10).unwrap();
        // niseko: 150, 170 -> 160; hakuba: 80
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total_snowfall_cm, Some(160));
        assert_eq!(rows[1].total_snowfall_cm, Some(80));
    }

    #[test]
    fn rank_window_without_data_is_empty() {
        let db = sample_db();
        let rows = db.rank_by_window(&window("08-01", "08-31"), 10).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn rank_ties_break_on_seasons_then_name() {
        let db = Database::new().unwrap();
        db.load_resorts(
            "\
id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m
b,Bravo,x,,,
a,Alpha,x,,,
c,Charlie,x,,,
",
        )
        .unwrap();
        db.load_snowfall(
            "\
a,2020-03-01,50
b,2020-03-01,50
c,2020-03-01,50
c,2021-03-01,50
",
        )
        .unwrap();
        let rows = db.rank_by_window(&window("03-01", "03-01"), 10).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.resort_name.as_str()).collect();
        assert_eq!(names, vec!["Charlie", "Alpha", "Bravo"]);
    }

    #[test]
    fn sql_window_filter_matches_calendar_window() {
        // One observation per day across a leap year, each reading 1 cm, so
        // the season sum equals the number of matching days.
        let db = Database::new().unwrap();
        db.load_resorts("id,name,prefecture\nr,R,x\n").unwrap();
        let mut csv = String::new();
        let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while day.year() == 2024 {
            csv.push_str(&format!("r,{},1\n", day.format("%Y-%m-%d")));
            day = day.succ_opt().unwrap();
        }
        db.load_snowfall(&csv).unwrap();

        for (s, e) in [("02-08", "02-14"), ("12-28", "01-05"), ("02-29", "03-02"), ("01-01", "12-31")] {
            let w = window(s, e);
            let mut seasons: BTreeMap<i32, i64> = BTreeMap::new();
            let mut matching_days = 0;
            let mut d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            while d.year() == 2024 {
                if w.contains_date(&d) {
                    matching_days += 1;
                }
                if let Some(season) = w.season_of(&d) {
                    *seasons.entry(season).or_default() += 1;
                }
                d = d.succ_opt().unwrap();
            }
            assert_eq!(seasons.values().sum::<i64>(), matching_days, "{}", w);
            let expected_avg =
                (seasons.values().sum::<i64>() as f64 / seasons.len() as f64).round() as i64;

            let rows = db.rank_by_window(&w, 1).unwrap();
            assert_eq!(rows[0].years_with_data, Some(seasons.len() as i64), "{}", w);
            assert_eq!(rows[0].total_snowfall_cm, Some(expected_avg), "{}", w);
        }
    }

    // ───────────────────── Metadata ─────────────────────

    #[test]
    fn resort_by_id_found_and_missing() {
        let db = sample_db();
        let hakuba = db.resort_by_id("hakuba").unwrap().unwrap();
        assert_eq!(hakuba.name, "Hakuba Happo-one");
        assert_eq!(hakuba.region, "nagano");
        assert!(db.resort_by_id("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn peak_periods_are_ordered_by_start() {
        let db = sample_db();
        let peaks = db.peak_periods_for_resort("hakuba").unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].start_date, md("02-01"));
        assert_eq!(peaks[1].start_date, md("12-28"));
        assert_eq!(peaks[1].end_date, md("01-10"));
        assert_eq!(peaks[1].avg_snowfall_cm, Some(180));
        assert!(db.peak_periods_for_resort("nozawa").unwrap().is_empty());
    }

    #[test]
    fn all_resorts_with_peaks_includes_resorts_without_peaks() {
        let db = sample_db();
        let all = db.all_resorts_with_peaks().unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.resort.name.as_str()).collect();
        assert_eq!(names, vec!["Hakuba Happo-one", "Niseko United", "Nozawa Onsen"]);
        assert_eq!(all[0].peaks.len(), 2);
        assert_eq!(all[1].peaks.len(), 1);
        assert_eq!(all[1].peaks[0].avg_snowfall_cm, None);
        assert!(all[2].peaks.is_empty());
    }

    #[test]
    fn observation_date_range_spans_loaded_data() {
        let db = sample_db();
        let range = db.observation_date_range().unwrap();
        assert_eq!(
            range,
            Some(("2022-02-08".to_string(), "2024-02-14".to_string()))
        );
        assert_eq!(Database::new().unwrap().observation_date_range().unwrap(), None);
    }

    #[test]
    fn bundled_fixtures_rank_as_expected() {
        let db = Database::new().unwrap();
        db.load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures"))
            .unwrap();

        let rows = db.rank_by_window(&window("02-08", "02-14"), 10).unwrap();
        let ranked: Vec<(&str, Option<i64>)> = rows
            .iter()
            .map(|r| (r.resort_name.as_str(), r.total_snowfall_cm))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("Hakuba Happo-one", Some(68)),
                ("Kagura", Some(65)),
                ("Niseko United", Some(63)),
                ("Nozawa Onsen", Some(33)),
                ("Zao Onsen", Some(20)),
            ]
        );

        let rows = db.rank_by_window(&window("12-28", "01-05"), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_snowfall_cm, Some(53));
        assert_eq!(rows[0].years_with_data, Some(2));
        assert_eq!(rows[0].num_courses, Some(2));
    }
}

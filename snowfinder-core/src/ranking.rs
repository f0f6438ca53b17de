//! Aggregation rows and the ranked response assembler.
//!
//! Storage returns rows already ordered best-first. The assembler never
//! re-sorts and never breaks ties; it only numbers rows 1..=N in the order
//! received. Missing metrics stay `None` and serialize as `null`.

use serde::{Deserialize, Serialize};

/// One resort's statistics for a calendar window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    pub resort_name: String,
    pub region: String,
    /// Average over seasons with data of the per-season snowfall sum, in cm.
    pub total_snowfall_cm: Option<i64>,
    pub years_with_data: Option<i64>,
    pub top_elevation_m: Option<i64>,
    pub base_elevation_m: Option<i64>,
    pub vertical_drop_m: Option<i64>,
    pub num_courses: Option<i64>,
    pub longest_course_km: Option<f64>,
}

/// An aggregation row with its 1-based position.
///
/// Field names match what the bundled web client reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Prefecture")]
    pub region: String,
    #[serde(rename = "AvgSnowfall")]
    pub total_snowfall_cm: Option<i64>,
    #[serde(rename = "YearsWithData")]
    pub years_with_data: Option<i64>,
    #[serde(rename = "TopElevation")]
    pub top_elevation_m: Option<i64>,
    #[serde(rename = "BaseElevation")]
    pub base_elevation_m: Option<i64>,
    #[serde(rename = "VerticalDrop")]
    pub vertical_drop_m: Option<i64>,
    #[serde(rename = "NumCourses")]
    pub num_courses: Option<i64>,
    #[serde(rename = "LongestCourseKM")]
    pub longest_course_km: Option<f64>,
}

impl RankedResult {
    fn new(rank: usize, row: AggregationRow) -> Self {
        Self {
            rank,
            name: row.resort_name,
            region: row.region,
            total_snowfall_cm: row.total_snowfall_cm,
            years_with_data: row.years_with_data,
            top_elevation_m: row.top_elevation_m,
            base_elevation_m: row.base_elevation_m,
            vertical_drop_m: row.vertical_drop_m,
            num_courses: row.num_courses,
            longest_course_km: row.longest_course_km,
        }
    }
}

/// Number rows 1..=N in input order.
pub fn assemble(rows: Vec<AggregationRow>) -> Vec<RankedResult> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedResult::new(i + 1, row))
        .collect()
}

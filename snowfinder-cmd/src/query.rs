//! One-shot ranking and lookup commands.
//!
//! These go through the same [`SnowFinder`] service the server uses, so
//! validation, bounded waits and error messages match the HTTP API.

use std::fmt::{self, Write};
use std::sync::Arc;

use log::info;
use snowfinder_core::{RankedResult, SearchRequest};
use snowfinder_web::{Assets, ServiceConfig, SnowFinder, SqliteStore};

use crate::StorageArgs;

/// Raw search flags, validated the same way as query parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub start: String,
    pub end: Option<String>,
    pub prefecture: Option<String>,
    pub limit: Option<String>,
}

impl SearchArgs {
    pub fn to_request(&self) -> anyhow::Result<SearchRequest> {
        Ok(SearchRequest::from_params(
            Some(self.start.as_str()),
            self.end.as_deref(),
            self.prefecture.as_deref(),
            self.limit.as_deref(),
        )?)
    }
}

fn service(storage: &StorageArgs) -> anyhow::Result<SnowFinder> {
    let db = storage.open()?;
    Ok(SnowFinder::new(
        Arc::new(SqliteStore::new(db)),
        Assets::embedded(),
        ServiceConfig::default(),
    ))
}

pub async fn run_search(storage: &StorageArgs, args: &SearchArgs, json: bool) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let app = service(storage)?;
    let results = app.search(&request).await?;
    info!(
        "[snowfinder] {} resorts ranked for {}",
        results.len(),
        request.window
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_table(&results)?);
    }
    Ok(())
}

pub async fn run_peaks(storage: &StorageArgs, resort_id: Option<&str>) -> anyhow::Result<()> {
    let app = service(storage)?;
    let peaks = app.peaks(resort_id).await?;
    println!("{}", serde_json::to_string_pretty(&peaks)?);
    Ok(())
}

pub async fn run_resorts(storage: &StorageArgs) -> anyhow::Result<()> {
    let app = service(storage)?;
    for option in app.resort_options().await? {
        println!("{}\t{}", option.id, option.name);
    }
    Ok(())
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Render results as a fixed-width text table.
pub fn format_table(results: &[RankedResult]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_table(&mut out, results)?;
    Ok(out)
}

fn write_table<W: Write>(out: &mut W, results: &[RankedResult]) -> fmt::Result {
    let name_width = results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Resort".len());
    let region_width = results
        .iter()
        .map(|r| r.region.chars().count())
        .max()
        .unwrap_or(0)
        .max("Prefecture".len());

    writeln!(
        out,
        "{:>4}  {:<nw$}  {:<rw$}  {:>8}  {:>5}  {:>6}  {:>7}",
        "Rank",
        "Resort",
        "Prefecture",
        "Avg cm",
        "Years",
        "Top m",
        "Courses",
        nw = name_width,
        rw = region_width
    )?;
    for r in results {
        writeln!(
            out,
            "{:>4}  {:<nw$}  {:<rw$}  {:>8}  {:>5}  {:>6}  {:>7}",
            r.rank,
            r.name,
            r.region,
            cell(r.total_snowfall_cm),
            cell(r.years_with_data),
            cell(r.top_elevation_m),
            cell(r.num_courses),
            nw = name_width,
            rw = region_width
        )?;
    }
    Ok(())
}

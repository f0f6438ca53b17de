//! Validation of raw search parameters.
//!
//! Everything a search needs is checked here before any storage call is
//! made: the window bounds, the region filter and the result limit.

use thiserror::Error;

use crate::month_day::MonthDay;
use crate::window::CalendarWindow;

/// Result count used when `limit` is absent, unparsable or not positive.
pub const DEFAULT_LIMIT: usize = 10;

/// Region value that means "every region".
pub const ALL_REGIONS: &str = "all";

/// Client input errors. The display strings are returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("start_date is required in MM-DD format")]
    MissingStartDate,

    #[error("start_date must be in MM-DD format (e.g., 02-08)")]
    InvalidStartDate(String),

    #[error("end_date must be in MM-DD format (e.g., 02-14)")]
    InvalidEndDate(String),
}

/// Optional exact-match restriction to one administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Only(String),
}

impl RegionFilter {
    /// Absent, empty and `"all"` mean no filter. Anything else is passed
    /// through verbatim; casing and whitespace are left to storage.
    pub fn from_param(region: Option<&str>) -> Self {
        match region {
            None | Some("") | Some(ALL_REGIONS) => RegionFilter::All,
            Some(region) => RegionFilter::Only(region.to_string()),
        }
    }

    pub fn as_region(&self) -> Option<&str> {
        match self {
            RegionFilter::All => None,
            RegionFilter::Only(region) => Some(region),
        }
    }
}

/// Parse a result limit. No upper cap is applied here.
pub fn parse_limit(limit: Option<&str>) -> usize {
    limit
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_LIMIT)
}

/// A validated ranking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub window: CalendarWindow,
    pub region: RegionFilter,
    pub limit: usize,
}

impl SearchRequest {
    /// Validate raw query-string values. Empty strings count as absent,
    /// matching how form submissions arrive.
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        region: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, SearchError> {
        let start_raw = start_date
            .filter(|s| !s.is_empty())
            .ok_or(SearchError::MissingStartDate)?;
        let start = MonthDay::parse(start_raw)
            .map_err(|_| SearchError::InvalidStartDate(start_raw.to_string()))?;

        let end = match end_date.filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(
                MonthDay::parse(raw).map_err(|_| SearchError::InvalidEndDate(raw.to_string()))?,
            ),
        };

        Ok(Self {
            window: CalendarWindow::normalize(start, end),
            region: RegionFilter::from_param(region),
            limit: parse_limit(limit),
        })
    }
}

//! Core types for the SnowFinder seasonal snowfall ranking.
//!
//! A search names a recurring calendar window (for example `02-08` to
//! `02-14`) and asks which resorts historically received the most snow
//! during that window across all recorded seasons. This crate holds the
//! pure parts of that contract:
//!
//! - [`month_day`] - `MM-DD` parsing and validation
//! - [`window`] - closed calendar windows, including ones that wrap New Year
//! - [`search`] - request parameter validation, region filter and result limit
//! - [`ranking`] - aggregation rows and the 1-based ranked result assembler
//! - [`resort`] - resort and peak-period reference records
//!
//! Nothing here performs I/O; storage lives in `snowfinder-db` and the HTTP
//! surface in `snowfinder-web`.

pub mod month_day;
pub mod ranking;
pub mod resort;
pub mod search;
pub mod window;

pub use month_day::{is_valid_month_day, MonthDay, MonthDayError};
pub use ranking::{assemble, AggregationRow, RankedResult};
pub use resort::{PeakPeriod, ResortOption, ResortRecord, ResortWithPeaks};
pub use search::{parse_limit, RegionFilter, SearchError, SearchRequest, DEFAULT_LIMIT};
pub use window::CalendarWindow;

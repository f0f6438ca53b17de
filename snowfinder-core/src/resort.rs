//! Resort reference records and their recurring peak periods.

use serde::{Deserialize, Serialize};

use crate::month_day::MonthDay;
use crate::window::CalendarWindow;

/// Immutable resort metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResortRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "prefecture")]
    pub region: String,
}

/// A resort's typical high season, as a recurring calendar interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakPeriod {
    pub start_date: MonthDay,
    pub end_date: MonthDay,
    /// Typical snowfall over the period, when recorded.
    pub avg_snowfall_cm: Option<i64>,
}

impl PeakPeriod {
    pub fn window(&self) -> CalendarWindow {
        CalendarWindow::normalize(self.start_date, Some(self.end_date))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResortWithPeaks {
    pub resort: ResortRecord,
    pub peaks: Vec<PeakPeriod>,
}

/// Selector entry: just enough to fill a drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResortOption {
    pub id: String,
    pub name: String,
}

impl From<&ResortWithPeaks> for ResortOption {
    fn from(rp: &ResortWithPeaks) -> Self {
        Self {
            id: rp.resort.id.clone(),
            name: rp.resort.name.clone(),
        }
    }
}

//! The storage seam.
//!
//! [`SnowStore`] is the contract the service needs from storage. The
//! SQLite implementation runs each query on the blocking pool; if the
//! awaiting future is dropped (request cancelled or bounded wait elapsed)
//! the running statement is interrupted instead of running to completion.

use std::time::Instant;

use async_trait::async_trait;
use snowfinder_core::{
    AggregationRow, CalendarWindow, PeakPeriod, RegionFilter, ResortRecord, ResortWithPeaks,
};
use snowfinder_db::{CancelFlag, Database, DbError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// The blocking task running the query panicked or was aborted.
    #[error("storage task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait SnowStore: Send + Sync {
    /// Resorts ranked by snowfall inside `window`, best first, at most
    /// `limit` rows. `RegionFilter::Only` restricts to an exact region.
    async fn rank(
        &self,
        window: CalendarWindow,
        region: RegionFilter,
        limit: usize,
    ) -> Result<Vec<AggregationRow>, StoreError>;

    async fn all_resorts_with_peaks(&self) -> Result<Vec<ResortWithPeaks>, StoreError>;

    /// `Ok(None)` when the id does not resolve.
    async fn resort_by_id(&self, id: &str) -> Result<Option<ResortRecord>, StoreError>;

    async fn peak_periods_for_resort(&self, resort_id: &str)
        -> Result<Vec<PeakPeriod>, StoreError>;
}

/// Sets its flag when dropped unless disarmed first.
struct CancelOnDrop(Option<CancelFlag>);

impl CancelOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(flag) = self.0.take() {
            log::debug!("[snowfinder] store: caller went away, cancelling query");
            flag.cancel();
        }
    }
}

/// [`SnowStore`] over a [`Database`].
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn run<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> snowfinder_db::Result<T> + Send + 'static,
    {
        let flag = CancelFlag::new();
        let guard = CancelOnDrop(Some(flag.clone()));
        let db = self.db.with_cancel_flag(flag);
        let started = Instant::now();

        let joined = tokio::task::spawn_blocking(move || query(&db)).await;
        guard.disarm();

        log::debug!(
            "[snowfinder] store: {} finished in {:?}",
            operation,
            started.elapsed()
        );
        let result = joined.map_err(|e| StoreError::Task(e.to_string()))?;
        Ok(result?)
    }
}

#[async_trait]
impl SnowStore for SqliteStore {
    async fn rank(
        &self,
        window: CalendarWindow,
        region: RegionFilter,
        limit: usize,
    ) -> Result<Vec<AggregationRow>, StoreError> {
        self.run("rank", move |db| match region.as_region() {
            None => db.rank_by_window(&window, limit),
            Some(region) => db.rank_by_window_and_region(&window, region, limit),
        })
        .await
    }

    async fn all_resorts_with_peaks(&self) -> Result<Vec<ResortWithPeaks>, StoreError> {
        self.run("all_resorts_with_peaks", |db| db.all_resorts_with_peaks())
            .await
    }

    async fn resort_by_id(&self, id: &str) -> Result<Option<ResortRecord>, StoreError> {
        let id = id.to_string();
        self.run("resort_by_id", move |db| db.resort_by_id(&id)).await
    }

    async fn peak_periods_for_resort(
        &self,
        resort_id: &str,
    ) -> Result<Vec<PeakPeriod>, StoreError> {
        let resort_id = resort_id.to_string();
        self.run("peak_periods_for_resort", move |db| {
            db.peak_periods_for_resort(&resort_id)
        })
        .await
    }
}

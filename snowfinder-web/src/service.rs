//! The SnowFinder service object.
//!
//! Holds the injected storage and page assets plus the bounded waits. It
//! validates nothing itself; handlers hand it an already validated
//! [`SearchRequest`] so bad input never costs a storage call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use snowfinder_core::{assemble, RankedResult, ResortOption, ResortWithPeaks, SearchRequest};

use crate::assets::Assets;
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::store::{SnowStore, StoreError};

/// Resort id values that mean "list every resort".
const ALL_RESORTS: &str = "all";

/// Either the full peak listing or one resort's peaks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PeaksResponse {
    All(Vec<ResortWithPeaks>),
    One(ResortWithPeaks),
}

pub struct SnowFinder {
    store: Arc<dyn SnowStore>,
    assets: Assets,
    config: ServiceConfig,
}

impl SnowFinder {
    pub fn new(store: Arc<dyn SnowStore>, assets: Assets, config: ServiceConfig) -> Self {
        Self {
            store,
            assets,
            config,
        }
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Rank resorts for a validated request.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<RankedResult>, ApiError> {
        let rows = bounded(
            "rank",
            self.config.query_timeout,
            self.store
                .rank(request.window, request.region.clone(), request.limit),
        )
        .await?;
        Ok(assemble(rows))
    }

    /// `{id, name}` pairs for selector UIs, from the full listing.
    pub async fn resort_options(&self) -> Result<Vec<ResortOption>, ApiError> {
        let all = bounded(
            "all_resorts_with_peaks",
            self.config.query_timeout,
            self.store.all_resorts_with_peaks(),
        )
        .await?;
        Ok(all.iter().map(ResortOption::from).collect())
    }

    /// Peak periods for one resort, or for all of them when `resort_id` is
    /// absent, empty or `"all"`.
    pub async fn peaks(&self, resort_id: Option<&str>) -> Result<PeaksResponse, ApiError> {
        match resort_id {
            None | Some("") | Some(ALL_RESORTS) => {
                let all = bounded(
                    "all_resorts_with_peaks",
                    self.config.query_timeout,
                    self.store.all_resorts_with_peaks(),
                )
                .await?;
                Ok(PeaksResponse::All(all))
            }
            Some(id) => {
                let lookup = async {
                    let resort = self
                        .store
                        .resort_by_id(id)
                        .await?
                        .ok_or_else(|| ApiError::NotFound("Resort not found".to_string()))?;
                    let peaks = self.store.peak_periods_for_resort(&resort.id).await?;
                    Ok::<_, ApiError>(ResortWithPeaks { resort, peaks })
                };
                let found = tokio::time::timeout(self.config.lookup_timeout, lookup)
                    .await
                    .map_err(|_| ApiError::Timeout {
                        operation: "resort_peaks",
                        after: self.config.lookup_timeout,
                    })??;
                Ok(PeaksResponse::One(found))
            }
        }
    }
}

/// Await a storage call for at most `after`. On expiry the call's future
/// is dropped, which cancels it.
async fn bounded<T, F>(operation: &'static str, after: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ApiError::Timeout { operation, after }),
    }
}

//! HTTP handlers.
//!
//! Query strings are taken as raw pairs rather than a typed struct so a
//! repeated key keeps its first value and malformed values reach our own
//! validation (and its client messages) instead of an extractor rejection.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::Html;
use axum::Json;
use snowfinder_core::{RankedResult, ResortOption, SearchRequest};

use crate::error::ApiError;
use crate::service::{PeaksResponse, SnowFinder};

type QueryPairs = Vec<(String, String)>;

/// First value supplied for `key`, if any.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// GET / - Landing page
pub async fn index_handler(Extension(app): Extension<Arc<SnowFinder>>) -> Html<String> {
    Html(app.assets().index_html().to_string())
}

/// GET /api/search - Resorts ranked by snowfall in a calendar window
pub async fn search_handler(
    Extension(app): Extension<Arc<SnowFinder>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<RankedResult>>, ApiError> {
    let request = SearchRequest::from_params(
        first_value(&pairs, "start_date"),
        first_value(&pairs, "end_date"),
        first_value(&pairs, "prefecture"),
        first_value(&pairs, "limit"),
    )?;
    log::info!(
        "[snowfinder] search window={} region={} limit={}",
        request.window,
        request.region.as_region().unwrap_or("all"),
        request.limit
    );
    let results = app.search(&request).await?;
    Ok(Json(results))
}

/// GET /api/peaks - Peak periods for one resort or all of them
pub async fn peaks_handler(
    Extension(app): Extension<Arc<SnowFinder>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<PeaksResponse>, ApiError> {
    let peaks = app.peaks(first_value(&pairs, "resort_id")).await?;
    Ok(Json(peaks))
}

/// GET /api/resorts - `{id, name}` pairs for resort selectors
pub async fn resorts_handler(
    Extension(app): Extension<Arc<SnowFinder>>,
) -> Result<Json<Vec<ResortOption>>, ApiError> {
    let options = app.resort_options().await?;
    Ok(Json(options))
}

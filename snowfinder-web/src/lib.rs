//! HTTP query API for seasonal snowfall rankings.
//!
//! The [`SnowFinder`] service object is built once at startup with an
//! injected [`SnowStore`] and page [`Assets`], then shared by reference with
//! every request handler through an axum `Extension`.

pub mod assets;
pub mod config;
pub mod error;
pub mod handlers;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::services::ServeDir;

pub use assets::Assets;
pub use config::ServiceConfig;
pub use error::ApiError;
pub use service::{PeaksResponse, SnowFinder};
pub use store::{SnowStore, SqliteStore, StoreError};

/// Build the application router around a shared service.
pub fn router(app: Arc<SnowFinder>) -> Router {
    let static_dir = app.assets().static_dir().map(|dir| dir.to_path_buf());

    let router = Router::new()
        .route("/", get(handlers::index_handler))
        .route("/api/search", get(handlers::search_handler))
        .route("/api/peaks", get(handlers::peaks_handler))
        .route("/api/resorts", get(handlers::resorts_handler));

    let router = match static_dir {
        Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
        None => router,
    };

    router.layer(Extension(app))
}

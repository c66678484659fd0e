//! # api-adapters
//!
//! The HTTP surface of Wildlog: routing, form handling and page rendering.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod state;
pub mod upload;
pub mod views;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Where uploaded photos live and how big a request may be.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub upload_dir: PathBuf,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

/// Builds the full application router.
///
/// # Developer Note
/// Stored photos are served straight from `upload_dir` under `url_prefix`,
/// which must match the prefix the photo store hands out in its URLs.
pub fn router(state: AppState, config: RouterConfig) -> Router {
    use handlers::{api, harvests, home, sightings};

    Router::new()
        .route("/", get(home::home))
        // Sightings
        .route("/sightings", get(sightings::list))
        .route("/add", get(sightings::new_form).post(sightings::create))
        .route("/delete", post(sightings::delete_many))
        .route("/sighting/{id}", get(sightings::detail))
        .route(
            "/edit-sighting/{id}",
            get(sightings::edit_form).post(sightings::update),
        )
        .route("/delete-sighting/{id}", post(sightings::delete))
        // Harvests
        .route("/harvests", get(harvests::list))
        .route("/add-harvest", get(harvests::new_form).post(harvests::create))
        .route("/harvest/{id}", get(harvests::detail))
        .route(
            "/edit-harvest/{id}",
            get(harvests::edit_form).post(harvests::update),
        )
        .route("/delete-harvest/{id}", post(harvests::delete))
        // JSON
        .route("/api/animals", get(api::animals))
        .route("/api/sightings", get(api::sightings))
        .route("/api/harvests", get(api::harvests))
        .nest_service(&config.url_prefix, ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

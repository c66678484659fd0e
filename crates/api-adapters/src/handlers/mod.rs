//! # Handlers
//!
//! Request flow: extract, validate, call the record service, then render or
//! redirect. Validation failures re-render the form with the submitted values.

pub mod api;
pub mod harvests;
pub mod home;
pub mod sightings;

use askama::Template;
use axum::response::{Html, Redirect};
use domains::{AppError, Notice, RecordId};
use serde::Deserialize;

use crate::error::ApiResult;

/// Query of the list pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub animal: Option<String>,
    pub sort: Option<String>,
    pub notice: Option<String>,
}

/// Query of the detail pages.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    pub notice: Option<String>,
}

pub(crate) fn render<T: Template>(page: T) -> ApiResult<Html<String>> {
    Ok(Html(page.render()?))
}

/// 303 to `path` carrying `notice` for the banner.
pub(crate) fn redirect_with(path: &str, notice: Notice) -> Redirect {
    Redirect::to(&format!("{path}?notice={}", notice.as_param()))
}

/// Parses the `{id}` path segment. An id that is not a number names no
/// record, so it is a 404 like any other missing one.
pub(crate) fn record_id(raw: &str, kind: &str) -> ApiResult<RecordId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(kind.to_string(), raw.to_string()).into())
}

//! JSON endpoints for the page scripts: the dynamic animal select and the
//! map layers.

use axum::extract::{Query, State};
use axum::Json;
use domains::{Harvest, ListQuery, Sighting};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::forms;
use crate::handlers::ListParams;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnimalParams {
    pub category: Option<String>,
    /// Any non-empty value asks for the flat list when no category is given.
    pub flat: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AnimalChoice {
    pub value: String,
    pub label: String,
}

pub async fn animals(Query(params): Query<AnimalParams>) -> Json<Vec<AnimalChoice>> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let allow_flat = params.flat.as_deref().is_some_and(|f| !f.is_empty());
    let choices = forms::animal_options(category, allow_flat)
        .into_iter()
        .map(|(value, label)| AnimalChoice { value, label })
        .collect();
    Json(choices)
}

pub async fn sightings(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Sighting>>> {
    let query = ListQuery::from_params(params.animal.as_deref(), params.sort.as_deref());
    let listing = state.records.list_sightings(&query).await?;
    Ok(Json(listing.records))
}

pub async fn harvests(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Harvest>>> {
    let query = ListQuery::from_params(params.animal.as_deref(), params.sort.as_deref());
    let listing = state.records.list_harvests(&query).await?;
    Ok(Json(listing.records))
}

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use domains::{AppError, FieldMap, ListQuery, Notice, RecordId};

use crate::error::ApiResult;
use crate::forms::{self, FormErrors};
use crate::handlers::sightings::unknown_animal;
use crate::handlers::{record_id, redirect_with, render, ListParams, NoticeParams};
use crate::state::AppState;
use crate::upload::read_record_form;
use crate::views::{notice_text, FormPage, HarvestListPage, RecordPage};

const LIST_PATH: &str = "/harvests";

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Html<String>> {
    let query = ListQuery::from_params(params.animal.as_deref(), params.sort.as_deref());
    let listing = state.records.list_harvests(&query).await?;
    let page = HarvestListPage::new(
        &listing,
        notice_text(params.notice.as_deref()),
        |file| state.records.photo_url(file),
    );
    render(page)
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<NoticeParams>,
) -> ApiResult<Html<String>> {
    let id = record_id(&raw_id, "harvest")?;
    let harvest = state.records.get_harvest(id).await?;
    let photo_url = harvest
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file))
        .unwrap_or_default();
    render(RecordPage::harvest(
        &harvest,
        notice_text(params.notice.as_deref()),
        photo_url,
    ))
}

pub async fn new_form() -> ApiResult<Html<String>> {
    render(FormPage::harvest(
        "Log a Harvest",
        "/add-harvest".to_string(),
        &FieldMap::new(),
        &FormErrors::default(),
    ))
}

pub async fn create(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let (fields, photo) = read_record_form(multipart).await?;
    let errors = forms::validate_harvest(&fields, photo.as_ref());
    if !errors.is_empty() {
        return rerender("Log a Harvest", "/add-harvest", &fields, errors, None);
    }

    match state.records.create_harvest(&fields, photo).await {
        Ok(saved) => Ok(redirect_with(LIST_PATH, saved.notice(Notice::Created)).into_response()),
        Err(AppError::UnknownAnimal(_)) => {
            rerender("Log a Harvest", "/add-harvest", &fields, unknown_animal(), None)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Html<String>> {
    let id = record_id(&raw_id, "harvest")?;
    let harvest = state.records.get_harvest(id).await?;
    let photo_url = harvest
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file));
    let page = FormPage::harvest(
        "Edit Harvest",
        edit_path(id),
        &forms::harvest_fields(&harvest),
        &FormErrors::default(),
    )
    .with_photo(photo_url);
    render(page)
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let id = record_id(&raw_id, "harvest")?;
    let existing = state.records.get_harvest(id).await?;
    let current_photo = existing
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file));

    let (fields, photo) = read_record_form(multipart).await?;
    let errors = forms::validate_harvest(&fields, photo.as_ref());
    if !errors.is_empty() {
        return rerender("Edit Harvest", &edit_path(id), &fields, errors, current_photo);
    }

    match state.records.update_harvest(id, &fields, photo).await {
        Ok(saved) => {
            let path = format!("/harvest/{id}");
            Ok(redirect_with(&path, saved.notice(Notice::Updated)).into_response())
        }
        Err(AppError::UnknownAnimal(_)) => {
            rerender("Edit Harvest", &edit_path(id), &fields, unknown_animal(), current_photo)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Redirect> {
    let id = record_id(&raw_id, "harvest")?;
    state.records.delete_harvest(id).await?;
    Ok(redirect_with(LIST_PATH, Notice::Deleted))
}

fn edit_path(id: RecordId) -> String {
    format!("/edit-harvest/{id}")
}

fn rerender(
    title: &str,
    action: &str,
    fields: &FieldMap,
    errors: FormErrors,
    current_photo: Option<String>,
) -> ApiResult<Response> {
    let page = FormPage::harvest(title, action.to_string(), fields, &errors).with_photo(current_photo);
    Ok(render(page)?.into_response())
}

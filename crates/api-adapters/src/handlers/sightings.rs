use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use domains::{AppError, FieldMap, ListQuery, Notice, RecordId};

use crate::error::ApiResult;
use crate::forms::{self, FormErrors};
use crate::handlers::{record_id, redirect_with, render, ListParams, NoticeParams};
use crate::state::AppState;
use crate::upload::read_record_form;
use crate::views::{notice_text, FormPage, RecordPage, SightingListPage};

const LIST_PATH: &str = "/sightings";

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Html<String>> {
    let query = ListQuery::from_params(params.animal.as_deref(), params.sort.as_deref());
    let listing = state.records.list_sightings(&query).await?;
    let page = SightingListPage::new(
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
    let id = record_id(&raw_id, "sighting")?;
    let sighting = state.records.get_sighting(id).await?;
    let photo_url = sighting
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file))
        .unwrap_or_default();
    render(RecordPage::sighting(
        &sighting,
        notice_text(params.notice.as_deref()),
        photo_url,
    ))
}

pub async fn new_form() -> ApiResult<Html<String>> {
    render(FormPage::sighting(
        "Log a Sighting",
        "/add".to_string(),
        &FieldMap::new(),
        &FormErrors::default(),
    ))
}

pub async fn create(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let (fields, photo) = read_record_form(multipart).await?;
    let errors = forms::validate_sighting(&fields, photo.as_ref());
    if !errors.is_empty() {
        return rerender("Log a Sighting", "/add", &fields, errors, None);
    }

    match state.records.create_sighting(&fields, photo).await {
        Ok(saved) => Ok(redirect_with(LIST_PATH, saved.notice(Notice::Created)).into_response()),
        Err(AppError::UnknownAnimal(_)) => {
            rerender("Log a Sighting", "/add", &fields, unknown_animal(), None)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Html<String>> {
    let id = record_id(&raw_id, "sighting")?;
    let sighting = state.records.get_sighting(id).await?;
    let photo_url = sighting
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file));
    let page = FormPage::sighting(
        "Edit Sighting",
        edit_path(id),
        &forms::sighting_fields(&sighting),
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
    let id = record_id(&raw_id, "sighting")?;
    let existing = state.records.get_sighting(id).await?;
    let current_photo = existing
        .details
        .photo_filename
        .as_deref()
        .map(|file| state.records.photo_url(file));

    let (fields, photo) = read_record_form(multipart).await?;
    let errors = forms::validate_sighting(&fields, photo.as_ref());
    if !errors.is_empty() {
        return rerender("Edit Sighting", &edit_path(id), &fields, errors, current_photo);
    }

    match state.records.update_sighting(id, &fields, photo).await {
        Ok(saved) => {
            let path = format!("/sighting/{id}");
            Ok(redirect_with(&path, saved.notice(Notice::Updated)).into_response())
        }
        Err(AppError::UnknownAnimal(_)) => {
            rerender("Edit Sighting", &edit_path(id), &fields, unknown_animal(), current_photo)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Redirect> {
    let id = record_id(&raw_id, "sighting")?;
    state.records.delete_sighting(id).await?;
    Ok(redirect_with(LIST_PATH, Notice::Deleted))
}

/// Batch delete from the list page checkboxes. Malformed and unknown ids
/// are skipped.
pub async fn delete_many(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult<Redirect> {
    let ids = delete_ids(&form);
    if ids.is_empty() {
        return Ok(Redirect::to(LIST_PATH));
    }
    state.records.delete_sightings(&ids).await?;
    Ok(redirect_with(LIST_PATH, Notice::Deleted))
}

fn delete_ids(form: &[(String, String)]) -> Vec<RecordId> {
    form.iter()
        .filter(|(key, _)| key == "delete_ids")
        .filter_map(|(_, value)| value.trim().parse().ok())
        .collect()
}

fn edit_path(id: RecordId) -> String {
    format!("/edit-sighting/{id}")
}

pub(crate) fn unknown_animal() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add("animal", "Selected animal not found in database.");
    errors
}

fn rerender(
    title: &str,
    action: &str,
    fields: &FieldMap,
    errors: FormErrors,
    current_photo: Option<String>,
) -> ApiResult<Response> {
    let page = FormPage::sighting(title, action.to_string(), fields, &errors).with_photo(current_photo);
    Ok(render(page)?.into_response())
}

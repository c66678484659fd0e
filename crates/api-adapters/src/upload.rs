//! Reads a `multipart/form-data` record form into a [`FieldMap`] plus the
//! optional photo part.

use axum::extract::Multipart;
use domains::{FieldMap, PhotoUpload};

use crate::error::{ApiError, ApiResult};

pub const PHOTO_FIELD: &str = "photo";

/// A file part with no name or no bytes counts as "no photo".
pub async fn read_record_form(mut multipart: Multipart) -> ApiResult<(FieldMap, Option<PhotoUpload>)> {
    let mut fields = FieldMap::new();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == PHOTO_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().and_then(|ct| ct.parse::<mime::Mime>().ok());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if !file_name.is_empty() && !data.is_empty() {
                photo = Some(PhotoUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        fields.insert(name, value);
    }

    Ok((fields, photo))
}

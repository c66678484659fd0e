//! Shared fixtures: a fully wired application over an in-memory SQLite store
//! and a throwaway upload directory, plus request builders for driving the
//! router without a socket.

use std::path::PathBuf;
use std::sync::Arc;

use api_adapters::{router, AppState, RouterConfig};
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use bytes::Bytes;
use domains::{FieldMap, PhotoUpload};
use services::{CatalogService, RecordService};
use storage_adapters::{LocalPhotoStore, SqliteStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const URL_PREFIX: &str = "/static/uploads";
pub const BOUNDARY: &str = "wildlog-test-boundary";

pub struct TestApp {
    pub store: Arc<SqliteStore>,
    pub records: Arc<RecordService>,
    pub router: Router,
    pub upload_dir: PathBuf,
    _tmp: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let upload_dir = tmp.path().join("uploads");
        Self::build(tmp, upload_dir).await
    }

    /// Upload root is a regular file, so every photo write fails.
    pub async fn with_unwritable_uploads() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let upload_dir = tmp.path().join("not-a-directory");
        std::fs::write(&upload_dir, b"occupied").expect("blocker file");
        Self::build(tmp, upload_dir).await
    }

    async fn build(tmp: TempDir, upload_dir: PathBuf) -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.expect("in-memory store"));
        CatalogService::new(store.clone())
            .ensure_seeded()
            .await
            .expect("seed registry");

        let photos = Arc::new(LocalPhotoStore::new(upload_dir.clone(), URL_PREFIX.to_string()));
        let records = Arc::new(RecordService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            photos,
        ));
        let router = router(
            AppState::new(records.clone()),
            RouterConfig {
                upload_dir: upload_dir.clone(),
                url_prefix: URL_PREFIX.to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
        );

        Self {
            store,
            records,
            router,
            upload_dir,
            _tmp: tmp,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }
}

pub fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn photo(name: &str, data: &'static [u8]) -> PhotoUpload {
    PhotoUpload {
        file_name: name.to_string(),
        content_type: Some(mime::IMAGE_JPEG),
        data: Bytes::from_static(data),
    }
}

/// A `multipart/form-data` POST as a browser would send the record forms.
/// Without a photo an empty file part is sent, like an untouched file input.
pub fn multipart_post(uri: &str, pairs: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in pairs {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    let (file_name, data) = photo.unwrap_or(("", &b""[..]));
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

pub fn form_post(uri: &str, encoded: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encoded.to_string()))
        .expect("request")
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8_lossy(&body_bytes(response).await).into_owned()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

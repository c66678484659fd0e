use axum::response::Html;

use crate::error::ApiResult;
use crate::handlers::render;
use crate::views::HomePage;

pub async fn home() -> ApiResult<Html<String>> {
    render(HomePage { title: "Wildlog" })
}

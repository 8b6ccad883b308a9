use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::ServeDir;
use tracing::error;

use crate::album::{Notice, PageState, PhotoAlbum, SearchStatus};
use crate::upload::SelectedFile;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

static ENGINE: Lazy<Handlebars<'static>> = Lazy::new(new_engine);

fn new_engine() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    if let Err(err) = handlebars.register_template_string("index", INDEX_TEMPLATE) {
        error!(error = %err, "index template failed to register");
    }
    handlebars
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse { error: message.to_string() })).into_response()
}

fn status_line(status: &SearchStatus) -> Option<String> {
    match status {
        SearchStatus::Idle => None,
        SearchStatus::Showing { query, count } => {
            Some(format!("{count} result(s) for \"{query}\""))
        }
        SearchStatus::Failed { message, .. } => Some(format!("Search failed: {message}")),
    }
}

fn last_query(status: &SearchStatus) -> &str {
    match status {
        SearchStatus::Idle => "",
        SearchStatus::Showing { query, .. } | SearchStatus::Failed { query, .. } => query,
    }
}

pub fn render_page(page: &PageState) -> Result<String, handlebars::RenderError> {
    ENGINE.render(
        "index",
        &json!({
            "notice": page.notice,
            "query": last_query(&page.search),
            "status": status_line(&page.search),
            "labels": page.labels,
            "nodes": page.gallery.nodes(),
            "updated": page
                .updated_at
                .map(|at| at.format("%H:%M:%S UTC").to_string()),
        }),
    )
}

fn page_response(status: StatusCode, page: &PageState) -> Response {
    match render_page(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("render page failed: {err}"),
        ),
    }
}

fn notice_status(notice: &Notice) -> StatusCode {
    match notice {
        Notice::Success(_) => StatusCode::OK,
        Notice::Rejected(_) => StatusCode::BAD_REQUEST,
        Notice::Failure(_) => StatusCode::BAD_GATEWAY,
    }
}

fn rejected_page(album: &PhotoAlbum, message: String) -> Response {
    let mut page = album.snapshot();
    page.notice = Some(Notice::Rejected(message));
    page_response(StatusCode::BAD_REQUEST, &page)
}

pub async fn index_page(State(album): State<Arc<PhotoAlbum>>) -> Response {
    page_response(StatusCode::OK, &album.snapshot())
}

pub async fn search_page(
    State(album): State<Arc<PhotoAlbum>>,
    Query(params): Query<SearchParams>,
) -> Response {
    album.search(&params.q).await;
    page_response(StatusCode::OK, &album.snapshot())
}

pub async fn gallery_json(State(album): State<Arc<PhotoAlbum>>) -> Response {
    Json(album.snapshot().gallery).into_response()
}

pub async fn toggle_labels(State(album): State<Arc<PhotoAlbum>>) -> Redirect {
    album.toggle_custom_labels();
    Redirect::to("/")
}

pub async fn handle_image_upload(
    State(album): State<Arc<PhotoAlbum>>,
    mut multipart: Multipart,
) -> Response {
    let mut file = None;
    let mut custom_labels = String::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.name().map(str::to_string).as_deref() {
                Some("file") => {
                    let content_type = field.content_type().map(|value| value.to_string());
                    let name = field.file_name().unwrap_or("").to_string();
                    match field.bytes().await {
                        Ok(data) => {
                            file = Some(SelectedFile {
                                name,
                                content_type,
                                bytes: data.to_vec(),
                            });
                        }
                        Err(err) => {
                            return rejected_page(&album, format!("Could not read the file: {err}"));
                        }
                    }
                }
                Some("customLabels") => match field.text().await {
                    Ok(text) => custom_labels = text,
                    Err(err) => {
                        return rejected_page(&album, format!("Could not read the labels: {err}"));
                    }
                },
                _ => {}
            },
            Ok(None) => break,
            Err(err) => {
                return rejected_page(&album, format!("Could not read the form: {err}"));
            }
        }
    }

    let file = match file {
        Some(file) if !file.name.is_empty() => file,
        _ => return rejected_page(&album, "Please choose a photo to upload.".to_string()),
    };

    let notice = album.upload(file, &custom_labels).await;
    let status = notice_status(&notice);
    let mut page = album.snapshot();
    page.notice = Some(notice);
    page_response(status, &page)
}

pub fn router(album: Arc<PhotoAlbum>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/search", get(search_page))
        .route(
            "/upload",
            post(handle_image_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/labels/toggle", post(toggle_labels))
        .route("/api/gallery", get(gallery_json))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(album)
}

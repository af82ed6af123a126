use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "frontend"]
struct FrontendAssets;

pub async fn serve_root() -> Response {
    serve_asset_path("index.html")
}

/// Fallback for every path without a route: embedded asset or 404.
pub async fn serve_path(uri: Uri) -> Response {
    serve_asset_path(uri.path())
}

fn serve_asset_path(path: &str) -> Response {
    let target = path.trim_start_matches('/');

    if target.is_empty() {
        return serve_asset_path("index.html");
    }
    if target.contains("..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    response_for_file(target).unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
}

fn response_for_file(path: &str) -> Option<Response> {
    let file = FrontendAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut response = Response::new(Body::from(file.data.into_owned()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref()).ok()?,
    );
    Some(response)
}

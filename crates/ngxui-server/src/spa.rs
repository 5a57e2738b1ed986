// ABOUTME: Static file serving from the asset tree and the single-page-application shell fallback.
// ABOUTME: Existing files are served as-is; unknown routes from browsers get index.html for client-side routing.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ngxui_core::API_PREFIX;

use crate::app_state::SharedState;
use crate::assets::{Asset, SHELL};
use crate::error::ApiError;

/// URL prefix the asset tree is mounted under.
pub const STATIC_PREFIX: &str = "/";

fn is_api_path(path: &str) -> bool {
    path == API_PREFIX
        || path
            .strip_prefix(API_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn asset_response(asset: Asset, content_type: &str) -> Response {
    let len = asset.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .body(asset.into_body())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Middleware serving files that exist in the asset tree before routing gets a say.
///
/// Only GET and HEAD are served, and nothing under the API prefix is looked up.
pub async fn serve_static(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let servable =
        (req.method() == Method::GET || req.method() == Method::HEAD) && !is_api_path(path);

    if !servable || !state.assets.exists(STATIC_PREFIX, path).await {
        return next.run(req).await;
    }

    match state.assets.open(path).await {
        Ok(asset) => {
            tracing::trace!(path = asset.path(), bytes = asset.len(), "serving static asset");
            let content_type = asset.content_type();
            asset_response(asset, &content_type)
        }
        // Vanished between the check and the open; let routing decide.
        Err(_) => next.run(req).await,
    }
}

/// Fallback for requests no route matched.
///
/// Browsers (Accept contains `text/html`) get the application shell; anything
/// else is a plain 404.
pub async fn spa_fallback(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if !accepts_html(&headers) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.assets.open(SHELL).await {
        Ok(asset) => asset_response(asset, "text/html"),
        Err(e) => {
            tracing::error!("application shell {} unavailable: {}", SHELL, e);
            ApiError::ShellUnavailable.into_response()
        }
    }
}

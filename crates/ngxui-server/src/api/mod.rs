// ABOUTME: Seam between the route table and the external API handler implementations.
// ABOUTME: Packs each matched request into an ApiCall and hands it to the configured ApiBackend.

pub mod proxy;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use ngxui_core::HandlerId;

use crate::app_state::SharedState;
use crate::auth::Authenticated;
use crate::error::ApiError;

pub use proxy::ProxyBackend;

/// Everything a handler receives about one matched API request.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub handler: HandlerId,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Path parameters in template order, exactly as they appeared in the URL.
    pub params: Vec<(String, String)>,
    pub body: Bytes,
    /// Present on protected routes once the auth gate has admitted the request.
    pub auth: Option<Authenticated>,
}

impl ApiCall {
    /// Look up a path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The external handler implementations behind the route table.
#[async_trait]
pub trait ApiBackend: Send + Sync {
    async fn handle(&self, call: ApiCall) -> Response;
}

/// Backend used when no handler implementation is wired in. Answers 501 for every route.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

#[async_trait]
impl ApiBackend for UnavailableBackend {
    async fn handle(&self, call: ApiCall) -> Response {
        ApiError::Unavailable(call.handler.as_str()).into_response()
    }
}

/// Axum handler shared by every route table entry.
pub async fn dispatch(
    State(state): State<SharedState>,
    handler: HandlerId,
    req: Request<Body>,
) -> Response {
    let (mut parts, body) = req.into_parts();

    // A handler never runs with a parameter missing from its template.
    let params: Vec<(String, String)> =
        match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            Err(rejection) => {
                tracing::debug!(handler = handler.as_str(), "rejecting path: {}", rejection);
                return ApiError::InvalidPathParam(rejection.body_text()).into_response();
            }
        };

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = e.into_inner();
            if exceeds_limit(&*err) {
                return ApiError::PayloadTooLarge {
                    limit: state.max_body_bytes,
                }
                .into_response();
            }
            tracing::warn!(handler = handler.as_str(), "request body could not be read: {}", err);
            return ApiError::BodyUnreadable.into_response();
        }
    };

    let call = ApiCall {
        handler,
        auth: parts.extensions.remove::<Authenticated>(),
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        params,
        body,
    };

    tracing::debug!(handler = handler.as_str(), method = %call.method, "dispatching api call");
    state.backend.handle(call).await
}

/// Whether a body error, or anything in its source chain, is the length limit.
fn exceeds_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(err), |e| e.source()).any(|e| e.is::<LengthLimitError>())
}

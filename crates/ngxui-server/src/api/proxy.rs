// ABOUTME: ApiBackend that forwards every API call to an upstream handler service over HTTP.
// ABOUTME: Strips hop-by-hop headers, passes the admitted credential along, and relays the upstream reply.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};

use super::{ApiBackend, ApiCall};
use crate::error::ApiError;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Forwards API calls to `base_url` + the original path and query.
#[derive(Debug, Clone)]
pub struct ProxyBackend {
    base_url: String,
    client: reqwest::Client,
}

impl ProxyBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            // The upstream is a local handler service; system proxy settings do not apply.
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn target(&self, call: &ApiCall) -> String {
        let path_and_query = call
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| call.uri.path());
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn forward(&self, call: ApiCall) -> Result<Response, ApiError> {
        let target = self.target(&call);

        let mut headers = HeaderMap::new();
        for (name, value) in call.headers.iter() {
            if !is_hop_by_hop_header(name.as_str()) {
                headers.append(name.clone(), value.clone());
            }
        }
        // Credentials admitted through the query token reach the upstream as a header too.
        if let Some(auth) = &call.auth {
            if let Ok(value) = HeaderValue::from_str(auth.credential.as_str()) {
                headers.insert(header::AUTHORIZATION, value);
            }
        }

        let upstream = self
            .client
            .request(call.method.clone(), &target)
            .headers(headers)
            .body(call.body)
            .timeout(UPSTREAM_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Upstream(format!("timed out after {}s", UPSTREAM_TIMEOUT.as_secs()))
                } else {
                    ApiError::Upstream(e.to_string())
                }
            })?;

        let status = upstream.status();
        let mut builder = Response::builder().status(status);
        for (name, value) in upstream.headers().iter() {
            if !is_hop_by_hop_header(name.as_str()) && name != header::CONTENT_LENGTH {
                builder = builder.header(name, value);
            }
        }

        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| ApiError::Upstream(format!("failed to read response body: {}", e)))?;

        builder
            .body(Body::from(bytes))
            .map_err(|e| ApiError::Upstream(format!("failed to build response: {}", e)))
    }
}

#[async_trait]
impl ApiBackend for ProxyBackend {
    async fn handle(&self, call: ApiCall) -> Response {
        let handler = call.handler;
        match self.forward(call).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(handler = handler.as_str(), "upstream call failed: {}", e);
                e.into_response()
            }
        }
    }
}

/// Hop-by-hop headers (RFC 2616 13.5.1) plus Host, which must name the upstream.
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
            | "host"
    )
}

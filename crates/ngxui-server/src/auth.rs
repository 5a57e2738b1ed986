// ABOUTME: Token authentication gate for the protected API group.
// ABOUTME: Extracts a credential from the Authorization header or base64 `token` query, then asks the validator.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, Response, header};
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ngxui_core::{Credential, CredentialSource, CredentialValidator};
use tower::{Layer, Service};

use crate::error::ApiError;

/// Name of the query parameter carrying a base64-encoded token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Attached to request extensions once the gate admits a request.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Why the gate turned a request away. Never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Missing,
    Invalid,
    ValidatorFailed,
}

impl RejectReason {
    fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Missing => "missing credential",
            RejectReason::Invalid => "credential not recognised",
            RejectReason::ValidatorFailed => "validator failed",
        }
    }
}

/// Outcome of running the gate on one request.
#[derive(Debug)]
pub enum GateDecision {
    Allow(Authenticated),
    Reject(RejectReason),
}

/// Pull a credential out of one source. Empty values count as absent.
pub fn extract_from<B>(source: CredentialSource, req: &Request<B>) -> Option<Credential> {
    match source {
        // Header bytes outside visible ASCII still form a credential, so a present
        // header is never skipped in favour of the query token.
        CredentialSource::Header => req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| Credential::new(String::from_utf8_lossy(v.as_bytes()))),
        CredentialSource::QueryToken => {
            let Query(params) = Query::<HashMap<String, String>>::try_from_uri(req.uri()).ok()?;
            let encoded = params.get(TOKEN_QUERY_PARAM)?;
            match STANDARD.decode(encoded) {
                Ok(bytes) => Credential::from_bytes(bytes),
                Err(_) => {
                    tracing::debug!("ignoring malformed {} query parameter", TOKEN_QUERY_PARAM);
                    None
                }
            }
        }
    }
}

/// Try every source in precedence order and stop at the first hit.
pub fn extract_credential<B>(req: &Request<B>) -> Option<(CredentialSource, Credential)> {
    CredentialSource::PRECEDENCE
        .iter()
        .find_map(|&source| extract_from(source, req).map(|cred| (source, cred)))
}

/// Decide whether an extracted credential admits the request.
pub async fn decide(
    validator: &dyn CredentialValidator,
    extracted: Option<(CredentialSource, Credential)>,
) -> GateDecision {
    let Some((source, credential)) = extracted else {
        return GateDecision::Reject(RejectReason::Missing);
    };

    match validator.validate(&credential).await {
        Ok(n) if n >= 1 => GateDecision::Allow(Authenticated { credential, source }),
        Ok(_) => GateDecision::Reject(RejectReason::Invalid),
        Err(e) => {
            tracing::error!(source = source.as_str(), "credential validation failed: {}", e);
            GateDecision::Reject(RejectReason::ValidatorFailed)
        }
    }
}

/// A tower Layer that puts the auth gate in front of a service.
#[derive(Clone)]
pub struct AuthLayer {
    validator: Arc<dyn CredentialValidator>,
}

impl AuthLayer {
    /// Create a new AuthLayer backed by the given validator.
    pub fn new(validator: Arc<dyn CredentialValidator>) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            validator: Arc::clone(&self.validator),
        }
    }
}

/// The middleware service that admits or rejects each request.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    validator: Arc<dyn CredentialValidator>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The request body is not Sync, so extraction happens before the future is built.
        let extracted = extract_credential(&req);
        let validator = Arc::clone(&self.validator);

        // Take the service that was driven to readiness and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match decide(validator.as_ref(), extracted).await {
                GateDecision::Allow(authenticated) => {
                    req.extensions_mut().insert(authenticated);
                    inner.call(req).await
                }
                GateDecision::Reject(reason) => {
                    tracing::debug!(path = %req.uri().path(), reason = reason.as_str(), "auth gate rejected request");
                    Ok(ApiError::AuthFailed.into_response())
                }
            }
        })
    }
}

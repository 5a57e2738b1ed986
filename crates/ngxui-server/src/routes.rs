// ABOUTME: Assembles the full Axum router: API route table, auth gate, static assets and SPA fallback.
// ABOUTME: The public and protected groups are built from the static route table in ngxui-core.

use std::collections::BTreeMap;

use axum::Router;
use axum::extract::{Request, State};
use axum::routing::{MethodFilter, MethodRouter, on};
use ngxui_core::{Access, RouteEntry, RouteMethod, routes_with};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::api::dispatch;
use crate::app_state::SharedState;
use crate::auth::AuthLayer;
use crate::spa::{serve_static, spa_fallback};

fn method_filter(method: RouteMethod) -> MethodFilter {
    match method {
        RouteMethod::Get => MethodFilter::GET,
        RouteMethod::Post => MethodFilter::POST,
        RouteMethod::Delete => MethodFilter::DELETE,
    }
}

fn entry_route(
    existing: Option<MethodRouter<SharedState>>,
    entry: &RouteEntry,
) -> MethodRouter<SharedState> {
    let handler = entry.handler;
    let endpoint =
        move |state: State<SharedState>, req: Request| async move { dispatch(state, handler, req).await };

    match existing {
        Some(router) => router.on(method_filter(entry.method), endpoint),
        None => on(method_filter(entry.method), endpoint),
    }
}

/// Router for one access group, one `MethodRouter` per path template.
fn group_router(access: Access) -> Router<SharedState> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<SharedState>> = BTreeMap::new();
    for entry in routes_with(access) {
        let existing = by_path.remove(entry.path);
        by_path.insert(entry.path, entry_route(existing, entry));
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| router.route(path, methods))
}

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    let public = group_router(Access::Public);
    let protected =
        group_router(Access::Protected).route_layer(AuthLayer::new(state.validator.clone()));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(spa_fallback)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            serve_static,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ABOUTME: End-to-end smoke test for the ngxui entry layer.
// ABOUTME: Wires a SQLite token store, the embedded frontend and a recording backend into one router.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Json;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::Request;
use ngxui_core::{HandlerId, ValidatorChain};
use ngxui_server::{ApiBackend, ApiCall, AppState, AssetTree, create_router};
use ngxui_store::SqliteTokenStore;
use tower::ServiceExt;

/// Backend standing in for the real handlers; remembers which ones ran.
#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<HandlerId>>,
}

#[async_trait]
impl ApiBackend for RecordingBackend {
    async fn handle(&self, call: ApiCall) -> Response {
        self.calls.lock().unwrap().push(call.handler);
        Json(serde_json::json!({
            "handler": call.handler.as_str(),
            "source": call.auth.map(|a| a.source.as_str()),
        }))
        .into_response()
    }
}

/// Helper to extract JSON body from a response.
async fn json_body(resp: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn text_body(resp: Response) -> String {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn smoke_test_gate_assets_and_routing() {
    // 1. Token database with one live session, written the way the login flow would.
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("database.db");
    let store = SqliteTokenStore::open(&db_path).unwrap();
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute(
            "INSERT INTO auth_tokens (token) VALUES (?1)",
            ["session-abc"],
        )
        .unwrap();
    }

    // 2. State: embedded frontend, store-backed validator, recording backend.
    let backend = Arc::new(RecordingBackend::default());
    let state = Arc::new(AppState::new(
        AssetTree::embedded().unwrap(),
        Arc::new(ValidatorChain::new().with(Arc::new(store))),
        Arc::clone(&backend) as Arc<dyn ApiBackend>,
    ));

    // 3. POST /api/login is public.
    let resp = create_router(Arc::clone(&state))
        .oneshot(
            Request::post("/api/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"admin","password":"admin"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "login should be reachable without a token");
    assert_eq!(json_body(resp).await["handler"], "login");

    // 4. GET /api/domains without a credential is rejected before any handler runs.
    let resp = create_router(Arc::clone(&state))
        .oneshot(Request::get("/api/domains").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(
        json_body(resp).await,
        serde_json::json!({ "message": "auth fail" })
    );

    // 5. An unknown token is rejected too.
    let resp = create_router(Arc::clone(&state))
        .oneshot(
            Request::get("/api/domains")
                .header("authorization", "stale-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // 6. The stored token admits the request through the header...
    let resp = create_router(Arc::clone(&state))
        .oneshot(
            Request::get("/api/domains")
                .header("authorization", "session-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json = json_body(resp).await;
    assert_eq!(json["handler"], "get_domains");
    assert_eq!(json["source"], "header");

    // 7. ...and through the base64 query token.
    let uri = format!("/api/analytic?token={}", STANDARD.encode("session-abc"));
    let resp = create_router(Arc::clone(&state))
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json = json_body(resp).await;
    assert_eq!(json["handler"], "analytic");
    assert_eq!(json["source"], "query_token");

    assert_eq!(
        *backend.calls.lock().unwrap(),
        vec![HandlerId::Login, HandlerId::GetDomains, HandlerId::Analytic]
    );

    // 8. Bundled assets are served directly.
    let resp = create_router(Arc::clone(&state))
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.contains("javascript"), "got {}", content_type);

    // 9. Client-side routes get the application shell when a browser asks.
    let resp = create_router(Arc::clone(&state))
        .oneshot(
            Request::get("/domain/example.com")
                .header("accept", "text/html,application/xhtml+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/html");
    let html = text_body(resp).await;
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Nginx UI"));

    // 10. ...but a JSON client gets a plain 404.
    let resp = create_router(state)
        .oneshot(
            Request::get("/domain/example.com")
                .header("accept", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

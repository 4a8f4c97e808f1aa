//! `/backoffice` router tests against a live Postgres instance.
//!
//! Skipped unless `DATABASE_URL` is set.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;
use vc_backoffice_service::create_router;
use vc_remote_db::DatabaseManager;

async fn test_router() -> Option<Router> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        }
    };
    let db = DatabaseManager::new(&url)
        .await
        .expect("failed to connect to test database");
    Some(create_router(Arc::new(db)))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn framework_create_then_read_preserves_section_order() {
    let Some(router) = test_router().await else { return };
    let name = unique("framework");

    let (status, created) = send(
        router.clone(),
        Method::POST,
        "/backoffice/promptframework",
        Some(json!({
            "name": name,
            "sections": [
                {"key": "azione", "content": "act", "order": 2},
                {"key": "ruolo", "content": "role", "order": 0},
                {"key": "obiettivo", "content": "goal", "order": 1}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap().to_string();
    let (status, fetched) = send(
        router.clone(),
        Method::GET,
        &format!("/backoffice/promptframework/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<&str> = fetched["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["ruolo", "obiettivo", "azione"]);

    let (status, _) = send(
        router,
        Method::DELETE,
        &format!("/backoffice/promptframework/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn agent_config_with_dangling_framework_returns_409() {
    let Some(router) = test_router().await else { return };

    let (status, body) = send(
        router,
        Method::POST,
        "/backoffice/agentconfig",
        Some(json!({
            "name": unique("agent"),
            "context": "chat",
            "prompt_framework_id": Uuid::now_v7()
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "referential_integrity");
}

#[tokio::test]
async fn configuration_post_upserts_in_place() {
    let Some(router) = test_router().await else { return };
    let key = unique("setting");

    let (status, first) = send(
        router.clone(),
        Method::POST,
        "/backoffice/configuration",
        Some(json!({"key": key, "value": "v1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = send(
        router.clone(),
        Method::POST,
        "/backoffice/configuration",
        Some(json!({"key": key, "value": "v2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);

    let (status, fetched) = send(
        router.clone(),
        Method::GET,
        &format!("/backoffice/configuration/{key}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["value"], "v2");

    let (status, _) = send(
        router,
        Method::DELETE,
        &format!("/backoffice/configuration/{key}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn builtin_tools_listing_needs_no_database_rows() {
    let Some(router) = test_router().await else { return };

    let (status, body) = send(router, Method::GET, "/backoffice/tools/builtin", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names, ["fetch_url", "current_time"]);
}

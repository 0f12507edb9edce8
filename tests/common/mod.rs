use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

/// In-process stand-in for the console backend
pub struct FakeBackend {
    pub base_url: String,
}

impl FakeBackend {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app()).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
        })
    }
}

fn app() -> Router {
    Router::new()
        .route("/api/users/:uid", get(user))
        .route("/api/organizations/:id", get(organization))
        .route("/api/organizations/:id/subscription", get(subscription))
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        None => Ok(()),
        Some(value) if value == format!("Bearer {}", TOKEN) => Ok(()),
        Some(_) => Err(failure(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

fn envelope(data: Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

async fn user(Path(uid): Path<String>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }

    let (organization_id, role) = match uid.as_str() {
        "u1" => (json!("org1"), "staff"),
        "u2" => (Value::Null, "teacher"),
        "u3" => (json!("broken"), "admin"),
        "u4" => (json!("org2"), "admin"),
        "slow" => (json!("slow-org"), "staff"),
        "root" => (Value::Null, "super_admin"),
        _ => return failure(StatusCode::NOT_FOUND, "user not found"),
    };

    envelope(json!({
        "id": uid,
        "email": format!("{}@example.com", uid),
        "organization_id": organization_id,
        "role": role
    }))
}

async fn organization(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }

    match id.as_str() {
        // Bare payload, no envelope
        "org1" => Json(json!({ "id": "org1", "name": "Acme", "city": "Pune" })).into_response(),
        "org2" => envelope(json!({ "id": "org2", "name": "Beacon" })),
        "slow-org" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            envelope(json!({ "id": "slow-org", "name": "Tortoise" }))
        }
        "broken" => failure(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        _ => failure(StatusCode::NOT_FOUND, "organization not found"),
    }
}

async fn subscription(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "org1" => envelope(json!({
            "id": "sub-org1",
            "organization_id": "org1",
            "plan": "growth",
            "status": "active",
            "current_period_end": "2026-12-01T00:00:00Z"
        })),
        "org2" => failure(StatusCode::SERVICE_UNAVAILABLE, "billing offline"),
        _ => failure(StatusCode::NOT_FOUND, "no subscription"),
    }
}

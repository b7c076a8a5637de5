// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod router_tests;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use crewplan_persistence::Persistence;
use serde_json::{Value, json};
use time::Duration;
use tower::ServiceExt;

use crate::{AppState, bootstrap_admin, build_router};

pub const ADMIN_PASSWORD: &str = "Render-Farm-42";

/// A router over a fresh in-memory database with one Admin operator.
pub fn create_test_app() -> Router {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    bootstrap_admin(&mut persistence, "admin", ADMIN_PASSWORD).expect("bootstrap admin");
    build_router(AppState::new(persistence, Duration::hours(1)))
}

/// Sends one request and returns the status, headers and raw body.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request: Request<Body> = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let headers: HeaderMap = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (
        status,
        headers,
        String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    )
}

/// Sends one request and parses the body as JSON.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, text) = send_raw(app, method, uri, token, body).await;
    let value: Value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).expect("JSON body")
    };
    (status, value)
}

/// Logs in and returns the session token.
pub async fn login(app: &Router, login_name: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "login_name": login_name, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["session_token"]
        .as_str()
        .expect("session token")
        .to_string()
}

/// Creates an operator with `role` as the Admin and logs in as them.
pub async fn login_with_role(
    app: &Router,
    admin_token: &str,
    login_name: &str,
    role: &str,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/admin/operators",
        Some(admin_token),
        Some(json!({
            "login_name": login_name,
            "display_name": "Coordinator",
            "password": ADMIN_PASSWORD,
            "password_confirmation": ADMIN_PASSWORD,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create operator failed: {body}");
    login(app, login_name, ADMIN_PASSWORD).await
}

/// Creates a member and returns its id.
pub async fn create_member(app: &Router, token: &str, emp_id: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/members",
        Some(token),
        Some(json!({
            "emp_id": emp_id,
            "name": format!("Artist {emp_id}"),
            "designation": "Compositor",
            "department": "Comp",
            "shift": "Day",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create member failed: {body}");
    body["member"]["member_id"].as_i64().expect("member id")
}

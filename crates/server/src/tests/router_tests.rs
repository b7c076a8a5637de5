// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    http::{HeaderMap, StatusCode, header},
};
use serde_json::{Value, json};

use super::{
    ADMIN_PASSWORD, create_member, create_test_app, login, login_with_role, send, send_raw,
};

#[tokio::test]
async fn test_health_needs_no_session() {
    let app: Router = create_test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app: Router = create_test_app();

    let (status, body) = send(&app, "GET", "/members", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Missing Authorization")
    );
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app: Router = create_test_app();

    let (status, _) = send(&app, "GET", "/auth/me", Some("not-a-session"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app: Router = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "login_name": "admin", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_login_whoami_and_logout() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;

    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["login_name"], "ADMIN");
    assert_eq!(me["role"], "Admin");

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_create_and_list() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;
    create_member(&app, &token, "E001").await;

    let (status, body) = send(&app, "GET", "/members?department=comp", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["members"][0]["emp_id"], "E001");
}

#[tokio::test]
async fn test_viewer_is_forbidden_from_editing() {
    let app: Router = create_test_app();
    let admin: String = login(&app, "admin", ADMIN_PASSWORD).await;
    let viewer: String = login_with_role(&app, &admin, "viewer", "Viewer").await;

    let (status, body) = send(
        &app,
        "POST",
        "/members",
        Some(&viewer),
        Some(json!({
            "emp_id": "E001",
            "name": "Ana",
            "designation": "Compositor",
            "department": "Comp",
            "shift": "Day",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app, "GET", "/admin/sessions", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_member_is_not_found() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/members/999",
        Some(&token),
        Some(json!({ "name": "Nobody" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_department_is_bad_request() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        "GET",
        "/reports/capacity?start_date=2026-03-02&end_date=2026-03-08&department=Catering",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("department"));
}

#[tokio::test]
async fn test_allocation_import_then_export() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;
    create_member(&app, &token, "E001").await;
    let upload: Value = json!({
        "file_name": "week10.csv",
        "csv_text": "Action,Emp ID,Show Name,Start Date,End Date,Total MD\n\
                     NEW,E001,Show A,2026-03-02,2026-03-04,3\n",
    });

    let (status, preview) = send(
        &app,
        "POST",
        "/allocations/import/preview",
        Some(&token),
        Some(upload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["committable_rows"], 1);

    let mut commit: Value = upload;
    commit["strategy"] = json!("add");
    let (status, result) = send(
        &app,
        "POST",
        "/allocations/import/commit",
        Some(&token),
        Some(commit),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{result}");
    assert_eq!(result["result"]["inserted"], 3);

    let (status, headers, csv): (StatusCode, HeaderMap, String) =
        send_raw(&app, "GET", "/allocations/export", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(csv.contains("\"2026-03-02\",\"2026-03-04\",\"3\",\"3\""));
}

#[tokio::test]
async fn test_commit_without_strategy_is_bad_request() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;
    create_member(&app, &token, "E001").await;

    let (status, _) = send(
        &app,
        "POST",
        "/allocations/import/commit",
        Some(&token),
        Some(json!({
            "file_name": "week10.csv",
            "csv_text": "Action,Emp ID,Show Name,Start Date,End Date,Total MD\n\
                         NEW,E001,Show A,2026-03-02,2026-03-02,1\n",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undo_twice_conflicts() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;
    create_member(&app, &token, "E001").await;

    let (_, activity) = send(&app, "GET", "/activity?entity_type=member", Some(&token), None).await;
    let log_id: i64 = activity["entries"][0]["log_id"].as_i64().unwrap();
    let uri: String = format!("/activity/{log_id}/undo");

    let (status, _) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], true);

    let (_, members) = send(&app, "GET", "/members", Some(&token), None).await;
    assert!(members["members"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_activity_export_is_csv() {
    let app: Router = create_test_app();
    let token: String = login(&app, "admin", ADMIN_PASSWORD).await;
    create_member(&app, &token, "E001").await;

    let (status, headers, csv): (StatusCode, HeaderMap, String) =
        send_raw(&app, "GET", "/activity/export", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("activity.csv")
    );
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn test_admin_can_disable_an_operator() {
    let app: Router = create_test_app();
    let admin: String = login(&app, "admin", ADMIN_PASSWORD).await;
    let manager: String = login_with_role(&app, &admin, "manager", "Manager").await;
    let (_, me) = send(&app, "GET", "/auth/me", Some(&manager), None).await;
    let operator_id: i64 = me["operator_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/operators/{operator_id}/disable"),
        Some(&admin),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_disabled"], true);
    let (status, _) = send(&app, "GET", "/auth/me", Some(&manager), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

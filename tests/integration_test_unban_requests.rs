mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::{json, Value};

async fn ban(app: &TestApp, admin_token: &str, user_id: &str) {
    let (status, _) = app.post(&format!("/api/v1/users/{}/ban", user_id), Some(admin_token), json!({ "reason": "abuse" })).await;
    assert_eq!(status, StatusCode::OK);
}

fn appeal(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password, "message": "It was a misunderstanding" })
}

#[tokio::test]
async fn test_banned_user_appeal_approved() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin().await;
    let (client, _) = app.client().await;
    ban(&app, &admin_token, &client.id).await;

    let (status, request) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");
    assert_eq!(request["user_id"], client.id.as_str());

    // One open appeal at a time
    let (status, _) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.get("/api/v1/unban-requests?status=pending", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let id = request["id"].as_str().unwrap();
    let (status, resolved) = app.post(&format!("/api/v1/unban-requests/{}/approve", id), Some(&admin_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "approved");
    assert!(resolved["resolved_at"].is_string());

    // Resolving twice conflicts
    let (status, _) = app.post(&format!("/api/v1/unban-requests/{}/reject", id), Some(&admin_token), json!({ "response": "late" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.login(&client.email, PASSWORD).await;
}

#[tokio::test]
async fn test_appeal_rejected_keeps_ban() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin().await;
    let (client, _) = app.client().await;
    ban(&app, &admin_token, &client.id).await;

    let (_, request) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;
    let id = request["id"].as_str().unwrap();

    let (status, resolved) = app.post(&format!("/api/v1/unban-requests/{}/reject", id), Some(&admin_token), json!({ "response": "Repeated abuse" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "rejected");
    assert_eq!(resolved["admin_response"], "Repeated abuse");

    let (status, body) = app.post("/api/v1/auth/login", None, json!({ "email": client.email, "password": PASSWORD })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["isBanned"], true);

    // A new appeal is allowed once the previous one is settled
    let (status, _) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_appeal_requires_credentials_and_a_ban() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin().await;
    let (client, client_token) = app.client().await;

    let (status, _) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    ban(&app, &admin_token, &client.id).await;

    let (status, _) = app.post("/api/v1/unban-requests", None, appeal(&client.email, "wrong-password")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/v1/unban-requests", None, json!({
        "email": client.email, "password": PASSWORD, "message": "   "
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.get("/api/v1/unban-requests", Some(&client_token)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/v1/unban-requests?status=maybe", Some(&admin_token)).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.post("/api/v1/unban-requests/missing/approve", Some(&admin_token), json!({})).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_direct_unban_settles_open_appeal() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin().await;
    let (client, _) = app.client().await;
    ban(&app, &admin_token, &client.id).await;

    let (_, request) = app.post("/api/v1/unban-requests", None, appeal(&client.email, PASSWORD)).await;

    app.post(&format!("/api/v1/users/{}/unban", client.id), Some(&admin_token), json!({})).await;

    let (_, list) = app.get("/api/v1/unban-requests", Some(&admin_token)).await;
    let listed = list.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], request["id"]);
    assert_eq!(listed[0]["status"], "approved");
}

mod common;

use axum::http::StatusCode;
use booked_backend::domain::models::user::Role;
use booked_backend::error::AppError;
use chrono::{Duration, Utc};
use common::{future_monday, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_booking_creates_pending_appointment() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (client, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;
    let monday = future_monday(1);

    let (status, body) = app.post("/api/v1/appointments", Some(&client_token), json!({
        "professional_id": pro.id,
        "date": monday.to_string(),
        "time": "09:30",
        "notes": "  First visit  ",
    })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["client_id"], client.id.as_str());
    assert_eq!(body["start_time"], "09:30");
    assert_eq!(body["end_time"], "10:00");
    assert_eq!(body["notes"], "First visit");

    let (status, mine) = app.get("/api/v1/appointments/user", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, theirs) = app.get("/api/v1/appointments/user", Some(&pro_token)).await;
    assert_eq!(theirs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, first_token) = app.client().await;
    let (_, second_token) = app.user_with_token("Second", "second@booked.test", Role::Client).await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;
    let monday = future_monday(1);

    assert_eq!(app.book(&first_token, &pro.id, monday, "10:00").await.0, StatusCode::CREATED);
    assert_eq!(app.book(&second_token, &pro.id, monday, "10:00").await.0, StatusCode::CONFLICT);
    // A repeated submit from the same client is rejected the same way
    assert_eq!(app.book(&first_token, &pro.id, monday, "10:00").await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_identical_bookings_yield_one_winner() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;
    let monday = future_monday(1);

    let (a, b) = tokio::join!(
        app.book(&client_token, &pro.id, monday, "11:00"),
        app.book(&client_token, &pro.id, monday, "11:00"),
    );
    let mut statuses = vec![a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_booking_outside_schedule_or_blocked_is_rejected() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "11:00").await;
    let monday = future_monday(1);

    // Off-grid, outside the window, and on a closed day
    assert_eq!(app.book(&client_token, &pro.id, monday, "09:15").await.0, StatusCode::CONFLICT);
    assert_eq!(app.book(&client_token, &pro.id, monday, "11:30").await.0, StatusCode::CONFLICT);
    assert_eq!(app.book(&client_token, &pro.id, monday + Duration::days(1), "09:00").await.0, StatusCode::CONFLICT);

    app.put(
        &format!("/api/v1/availability/{}/{}", pro.id, monday),
        Some(&pro_token),
        json!({ "slots": [{ "time": "09:00", "available": false }] }),
    ).await;
    assert_eq!(app.book(&client_token, &pro.id, monday, "09:00").await.0, StatusCode::CONFLICT);
    assert_eq!(app.book(&client_token, &pro.id, monday, "11:00").await.0, StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_input_validation() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (client, client_token) = app.client().await;
    let monday = future_monday(1);

    assert_eq!(app.book(&client_token, &pro.id, monday, "9:00").await.0, StatusCode::BAD_REQUEST);

    let last_week = Utc::now().date_naive() - Duration::days(7);
    assert_eq!(app.book(&client_token, &pro.id, last_week, "09:00").await.0, StatusCode::BAD_REQUEST);

    // Booking against a non-professional
    assert_eq!(app.book(&client_token, &client.id, monday, "09:00").await.0, StatusCode::NOT_FOUND);

    // Professionals do not book
    assert_eq!(app.book(&pro_token, &pro.id, monday, "09:00").await.0, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/v1/appointments", None, json!({
        "professional_id": pro.id, "date": monday.to_string(), "start_time": "09:00"
    })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_books_on_behalf_of_client() {
    let app = TestApp::new().await;
    let (pro, _) = app.professional().await;
    let (client, _) = app.client().await;
    let (_, admin_token) = app.admin().await;
    let monday = future_monday(1);

    let (status, _) = app.book(&admin_token, &pro.id, monday, "09:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/v1/appointments", Some(&admin_token), json!({
        "professional_id": pro.id, "date": monday.to_string(), "start_time": "09:00", "client_id": client.id
    })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["client_id"], client.id.as_str());
}

#[tokio::test]
async fn test_service_must_belong_to_professional_and_be_active() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, other_token) = app.user_with_token("Other Pro", "other@booked.test", Role::Professional).await;
    let (_, client_token) = app.client().await;
    let monday = future_monday(1);

    let (_, foreign) = app.post("/api/v1/services", Some(&other_token), json!({ "name": "Massage", "price_cents": 5000 })).await;
    let (_, own) = app.post("/api/v1/services", Some(&pro_token), json!({ "name": "Checkup", "price_cents": 3000 })).await;

    let book_with = |service_id: String, start: &'static str| json!({
        "professional_id": pro.id, "date": monday.to_string(), "start_time": start, "service_id": service_id
    });

    let (status, _) = app.post("/api/v1/appointments", Some(&client_token), book_with(foreign["id"].as_str().unwrap().into(), "09:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/v1/appointments", Some(&client_token), book_with(own["id"].as_str().unwrap().into(), "09:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["service_id"], own["id"]);

    app.put(&format!("/api/v1/services/{}", own["id"].as_str().unwrap()), Some(&pro_token), json!({ "is_active": false })).await;
    let (status, _) = app.post("/api/v1/appointments", Some(&client_token), book_with(own["id"].as_str().unwrap().into(), "09:30")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_transitions() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    let monday = future_monday(1);

    let (_, appt) = app.book(&client_token, &pro.id, monday, "09:00").await;
    let uri = format!("/api/v1/appointments/{}/status", appt["id"].as_str().unwrap());

    // Clients cannot confirm
    assert_eq!(app.patch(&uri, Some(&client_token), json!({ "status": "confirmed" })).await.0, StatusCode::FORBIDDEN);
    // pending -> completed is not allowed
    assert_eq!(app.patch(&uri, Some(&pro_token), json!({ "status": "completed" })).await.0, StatusCode::CONFLICT);
    assert_eq!(app.patch(&uri, Some(&pro_token), json!({ "status": "archived" })).await.0, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&uri, Some(&pro_token), json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = app.patch(&uri, Some(&pro_token), json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    // Terminal
    assert_eq!(app.patch(&uri, Some(&pro_token), json!({ "status": "cancelled" })).await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_client_cancel_frees_slot() {
    let app = TestApp::new().await;
    let (pro, _) = app.professional().await;
    let (_, client_token) = app.client().await;
    let (_, other_token) = app.user_with_token("Other", "other@booked.test", Role::Client).await;
    let monday = future_monday(1);

    let (_, appt) = app.book(&client_token, &pro.id, monday, "09:00").await;
    let uri = format!("/api/v1/appointments/{}/status", appt["id"].as_str().unwrap());

    // Someone else's appointment
    assert_eq!(app.patch(&uri, Some(&other_token), json!({ "status": "cancelled" })).await.0, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, Some(&client_token), json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (_, body) = app.get(&format!("/api/v1/availability/{}?date={}", pro.id, monday), None).await;
    assert!(body["slots"].as_array().unwrap().iter().any(|s| s == "09:00"));
    assert_eq!(app.book(&other_token, &pro.id, monday, "09:00").await.0, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reschedule_and_notes() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    let (_, other_token) = app.user_with_token("Other", "other@booked.test", Role::Client).await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "11:00").await;
    let monday = future_monday(1);

    let (_, appt) = app.book(&client_token, &pro.id, monday, "09:00").await;
    app.book(&other_token, &pro.id, monday, "10:00").await;
    let uri = format!("/api/v1/appointments/{}", appt["id"].as_str().unwrap());

    // Taken by someone else
    assert_eq!(app.put(&uri, Some(&client_token), json!({ "start_time": "10:00" })).await.0, StatusCode::CONFLICT);

    // Same time, new notes
    let (status, body) = app.put(&uri, Some(&client_token), json!({ "start_time": "09:00", "notes": "Bring x-rays" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "Bring x-rays");

    let (status, body) = app.put(&uri, Some(&client_token), json!({ "start_time": "10:30" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_time"], "10:30");
    assert_eq!(body["end_time"], "11:00");

    let (_, body) = app.get(&format!("/api/v1/availability/{}?date={}", pro.id, monday), None).await;
    let slots: Vec<&str> = body["slots"].as_array().unwrap().iter().map(|s| s.as_str().unwrap()).collect();
    assert_eq!(slots, vec!["09:00", "09:30", "11:00"]);

    assert_eq!(app.put(&uri, Some(&other_token), json!({ "notes": "hijack" })).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_listing_and_access_rules() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    let (_, admin_token) = app.admin().await;
    let (_, stranger_token) = app.user_with_token("Stranger", "stranger@booked.test", Role::Client).await;
    let monday = future_monday(1);
    let next_monday = future_monday(2);

    let (_, first) = app.book(&client_token, &pro.id, monday, "09:00").await;
    app.book(&client_token, &pro.id, next_monday, "09:00").await;
    let first_id = first["id"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/v1/appointments/professional/{}?date={}", pro.id, monday), Some(&pro_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get(&format!("/api/v1/appointments/professional/{}?status=pending", pro.id), Some(&pro_token)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    assert_eq!(app.get(&format!("/api/v1/appointments/professional/{}", pro.id), Some(&client_token)).await.0, StatusCode::FORBIDDEN);

    assert_eq!(app.get("/api/v1/appointments", Some(&pro_token)).await.0, StatusCode::FORBIDDEN);
    let (status, body) = app.get("/api/v1/appointments?status=confirmed", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = app.get("/api/v1/appointments", Some(&admin_token)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    assert_eq!(app.get(&format!("/api/v1/appointments/{}", first_id), Some(&client_token)).await.0, StatusCode::OK);
    assert_eq!(app.get(&format!("/api/v1/appointments/{}", first_id), Some(&stranger_token)).await.0, StatusCode::FORBIDDEN);

    assert_eq!(app.delete(&format!("/api/v1/appointments/{}", first_id), Some(&client_token)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&format!("/api/v1/appointments/{}", first_id), Some(&admin_token)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&format!("/api/v1/appointments/{}", first_id), Some(&admin_token)).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stale_writes_cannot_reopen_closed_appointment() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;

    let (_, booked) = app.book(&client_token, &pro.id, future_monday(1), "09:00").await;
    let id = booked["id"].as_str().unwrap().to_string();

    // Copy read before the cancellation lands
    let mut stale = app.state.appointment_repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stale.status, "pending");

    let (status, _) = app.patch(&format!("/api/v1/appointments/{}/status", id), Some(&client_token), json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);

    stale.notes = Some("late edit".into());
    stale.updated_at = Utc::now();
    let err = app.state.appointment_repo.update_details(&stale).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "unexpected error: {:?}", err);

    // A transition based on the old status loses as well
    let err = app.state.appointment_repo
        .transition_status(&id, "pending", "confirmed", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "unexpected error: {:?}", err);

    let (_, current) = app.get(&format!("/api/v1/appointments/{}", id), Some(&client_token)).await;
    assert_eq!(current["status"], "cancelled");
    assert!(current["notes"].is_null());
}

#[tokio::test]
async fn test_notes_update_keeps_concurrent_status_change() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;

    let (_, booked) = app.book(&client_token, &pro.id, future_monday(1), "10:00").await;
    let id = booked["id"].as_str().unwrap().to_string();

    let mut stale = app.state.appointment_repo.find_by_id(&id).await.unwrap().unwrap();
    app.patch(&format!("/api/v1/appointments/{}/status", id), Some(&pro_token), json!({ "status": "confirmed" })).await;

    stale.notes = Some("bring referral".into());
    let saved = app.state.appointment_repo.update_details(&stale).await.unwrap();
    assert_eq!(saved.status, "confirmed");
    assert_eq!(saved.notes.as_deref(), Some("bring referral"));
}

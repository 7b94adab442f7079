mod common;

use axum::http::StatusCode;
use booked_backend::domain::models::job::{Job, JOB_REMINDER};
use chrono::Utc;
use common::{future_monday, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_appointment_lifecycle_mails() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (client, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;

    let (status, appt) = app.book(&client_token, &pro.id, future_monday(1), "10:00").await;
    assert_eq!(status, StatusCode::CREATED);
    let id = appt["id"].as_str().unwrap().to_string();

    // Only the creation notice is due; the reminder waits until the day before
    assert_eq!(app.run_jobs().await, 1);
    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient, pro.email);
    assert_eq!(emails[0].subject, "New appointment request");
    assert!(emails[0].html_body.contains(&client.name));
    assert!(emails[0].html_body.contains(&format!("http://app.test/appointments/{}", id)));
    assert!(emails[0].attachment_name.is_none());

    let (status, _) = app.patch(&format!("/api/v1/appointments/{}/status", id), Some(&pro_token), json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.run_jobs().await, 1);
    let confirmed = app.sent_emails().pop().unwrap();
    assert_eq!(confirmed.recipient, client.email);
    assert_eq!(confirmed.attachment_name.as_deref(), Some("invite.ics"));
    let ics = String::from_utf8(confirmed.attachment_data.unwrap()).unwrap();
    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert!(ics.contains("BEGIN:VEVENT"));

    let (status, _) = app.patch(&format!("/api/v1/appointments/{}/status", id), Some(&client_token), json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.run_jobs().await, 1);
    let cancelled = app.sent_emails().pop().unwrap();
    assert_eq!(cancelled.recipient, client.email);
    assert!(cancelled.attachment_name.is_none());
    assert_eq!(app.sent_emails().len(), 3);
}

#[tokio::test]
async fn test_reminder_skipped_for_cancelled_appointment() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (_, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;

    let (_, appt) = app.book(&client_token, &pro.id, future_monday(1), "09:30").await;
    let id = appt["id"].as_str().unwrap().to_string();
    app.run_jobs().await;

    app.patch(&format!("/api/v1/appointments/{}/status", id), Some(&pro_token), json!({ "status": "cancelled" })).await;
    app.run_jobs().await;
    let before = app.sent_emails().len();

    // A reminder that slipped through is claimed but sends nothing
    app.state.job_repo.create(&Job::new(JOB_REMINDER, id.clone(), Utc::now())).await.unwrap();
    assert_eq!(app.run_jobs().await, 1);
    assert_eq!(app.sent_emails().len(), before);
}

#[tokio::test]
async fn test_reminder_sent_for_active_appointment() {
    let app = TestApp::new().await;
    let (pro, pro_token) = app.professional().await;
    let (client, client_token) = app.client().await;
    app.set_monday_hours(&pro.id, &pro_token, "09:00", "12:00").await;

    let (_, appt) = app.book(&client_token, &pro.id, future_monday(1), "11:00").await;
    let id = appt["id"].as_str().unwrap().to_string();
    app.run_jobs().await;

    app.state.job_repo.create(&Job::new(JOB_REMINDER, id, Utc::now())).await.unwrap();
    assert_eq!(app.run_jobs().await, 1);

    let reminder = app.sent_emails().pop().unwrap();
    assert_eq!(reminder.recipient, client.email);
    assert_eq!(reminder.subject, "Reminder: upcoming appointment");

    // Nothing left to claim
    assert_eq!(app.run_jobs().await, 0);
}

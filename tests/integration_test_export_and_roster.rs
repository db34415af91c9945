mod common;

use axum::http::{header, StatusCode};
use attendance_backend::domain::models::user::Role;
use attendance_backend::domain::services::checkin::CheckInAttempt;
use common::{parse_body, series_draft, standalone_draft, utc, TestApp};

#[tokio::test]
async fn test_csv_export_and_roster() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner@example.com", "Owner", &[Role::Organizer]).await;
    let rival = app.seed_user("rival@example.com", "Rival", &[Role::Organizer]).await;
    let admin = app.seed_user("admin@example.com", "Admin", &[Role::Admin]).await;
    let ann = app.seed_user("ann@example.com", "Ann", &[Role::Attendee]).await;
    let bob = app.seed_user("bob@example.com", "Bob", &[Role::Attendee]).await;

    let created = app.create_event(&owner, standalone_draft("Lecture", "2025-01-06T10:00", "2025-01-06T11:00")).await;
    for (who, at) in [(&ann, "2025-01-06T09:50:00Z"), (&bob, "2025-01-06T10:02:00Z")] {
        app.state.checkin_service.check_in(CheckInAttempt {
            token: created.event.checkin_token.clone(),
            attendee_id: who.id().to_string(),
            now: utc(at),
            source_ip: None,
            user_agent: None,
        }).await.unwrap();
    }

    let uri = format!("/api/v1/events/{}/attendance.csv", created.event.id);
    let response = app.send("GET", &uri, Some(&app.token_for(owner.id())), None, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert!(response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().contains(".csv"));

    let csv = match parse_body(response).await {
        serde_json::Value::String(s) => s,
        other => panic!("expected CSV text, got {}", other),
    };
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "attendance_id,event_id,attendee_id,checked_in_at");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(ann.id()));
    assert!(lines[1].ends_with("2025-01-06T09:50:00+00:00"));
    assert!(lines[2].contains(bob.id()));

    let response = app.send("GET", &uri, Some(&app.token_for(rival.id())), None, &[]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send("GET", &uri, Some(&app.token_for(admin.id())), None, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, roster) = app.send_json(
        "GET",
        &format!("/api/v1/events/{}/attendees", created.event.id),
        Some(&app.token_for(owner.id())),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0]["name"], "Ann");
    assert_eq!(roster[0]["email"], "ann@example.com");

    let (status, _) = app.send_json("GET", "/api/v1/events/missing/attendance.csv", Some(&app.token_for(admin.id())), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_series_cascades() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner@example.com", "Owner", &[Role::Organizer]).await;
    let rival = app.seed_user("rival@example.com", "Rival", &[Role::Organizer]).await;
    let ann = app.seed_user("ann@example.com", "Ann", &[Role::Attendee]).await;

    let created = app.create_event(
        &owner,
        series_draft("Yoga", "2025-01-06T10:00", "2025-01-06T11:00", &["Mon"], "2025-01-20", None, vec![ann.id().to_string()]),
    ).await;
    let first = &created.sessions[0];
    app.state.checkin_service.check_in(CheckInAttempt {
        token: first.checkin_token.clone(),
        attendee_id: ann.id().to_string(),
        now: first.start_time,
        source_ip: None,
        user_agent: None,
    }).await.unwrap();

    let uri = format!("/api/v1/events/{}", created.event.id);
    let (status, _) = app.send_json("DELETE", &uri, Some(&app.token_for(rival.id())), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send_json("DELETE", &uri, Some(&app.token_for(owner.id())), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events").fetch_one(&app.pool).await.unwrap();
    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_members").fetch_one(&app.pool).await.unwrap();
    let attendances: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendances").fetch_one(&app.pool).await.unwrap();
    assert_eq!((events, members, attendances), (0, 0, 0));

    let (status, _) = app.send_json("DELETE", &uri, Some(&app.token_for(owner.id())), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

mod common;

use axum::http::StatusCode;
use attendance_backend::domain::models::user::Role;
use attendance_backend::domain::services::{checkin::CheckInAttempt, dashboard::Dashboard};
use chrono::{Duration, Utc};
use common::{parse_body, series_draft, standalone_draft, utc, TestApp};

#[tokio::test]
async fn test_attendee_dashboard_orders_series_by_next_session() {
    let app = TestApp::new().await;
    let organizer = app.seed_user("org@example.com", "Olga", &[Role::Organizer]).await;
    let member = app.seed_user("m@example.com", "Mia", &[Role::Attendee]).await;
    let members = vec![member.id().to_string()];

    let finished = app.create_event(
        &organizer,
        series_draft("Finished", "2025-01-06T10:00", "2025-01-06T11:00", &["Mon"], "2025-01-13", None, members.clone()),
    ).await;
    let later = app.create_event(
        &organizer,
        series_draft("Later", "2025-01-06T10:00", "2025-01-06T11:00", &["Fri"], "2025-02-28", None, members.clone()),
    ).await;
    let sooner = app.create_event(
        &organizer,
        series_draft("Sooner", "2025-01-06T10:00", "2025-01-06T11:00", &["Wed"], "2025-02-28", None, members),
    ).await;
    // not a member of this one
    app.create_event(
        &organizer,
        series_draft("Other", "2025-01-06T10:00", "2025-01-06T11:00", &["Tue"], "2025-02-28", None, vec![]),
    ).await;

    // Monday 2025-01-20: next Wednesday is the 22nd, next Friday the 24th
    let now = utc("2025-01-20T12:00:00Z");
    let dashboard = app.state.dashboard_service.attendee_view(member.id(), now).await.unwrap();

    let ids: Vec<&str> = dashboard.series.iter().map(|s| s.series.id.as_str()).collect();
    assert_eq!(ids, vec![sooner.event.id.as_str(), later.event.id.as_str(), finished.event.id.as_str()]);
    assert_eq!(dashboard.series[0].summary.next_session.as_ref().unwrap().start_time, utc("2025-01-22T10:00:00Z"));
    assert!(dashboard.series[2].summary.next_session.is_none());
    assert_eq!(dashboard.series[2].summary.missed, 2);
}

#[tokio::test]
async fn test_organizer_dashboard_and_mine_endpoints() {
    let app = TestApp::new().await;
    let organizer = app.seed_user("org@example.com", "Olga", &[Role::Organizer, Role::Attendee]).await;

    let now = Utc::now();
    let past_start = now - Duration::days(2);
    let future_start = now + Duration::days(2);
    let past = app.create_event(&organizer, standalone_draft("Past", &past_start.to_rfc3339(), &(past_start + Duration::hours(1)).to_rfc3339())).await;
    let future = app.create_event(&organizer, standalone_draft("Future", &future_start.to_rfc3339(), &(future_start + Duration::hours(1)).to_rfc3339())).await;

    app.state.checkin_service.check_in(CheckInAttempt {
        token: past.event.checkin_token.clone(),
        attendee_id: organizer.id().to_string(),
        now: past.event.start_time,
        source_ip: None,
        user_agent: None,
    }).await.unwrap();

    let view = app.state.dashboard_service.build(organizer.id(), Role::Organizer, now).await.unwrap();
    match view {
        Dashboard::Organizer(d) => {
            assert_eq!(d.upcoming.len(), 1);
            assert_eq!(d.upcoming[0].event.id, future.event.id);
            assert_eq!(d.past.len(), 1);
            assert_eq!(d.past[0].event.id, past.event.id);
            assert_eq!(d.past[0].attendance_count, 1);
            assert_eq!(d.upcoming[0].attendance_count, 0);
        }
        Dashboard::Attendee(_) => panic!("expected organizer view"),
    }

    let token = app.token_for(organizer.id());
    let (status, upcoming) = app.send_json("GET", "/api/v1/events/mine/upcoming", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upcoming.as_array().unwrap().len(), 1);
    assert_eq!(upcoming[0]["id"], future.event.id);
    assert_eq!(upcoming[0]["attendance_count"], 0);

    let (status, past_list) = app.send_json("GET", "/api/v1/events/mine/past", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(past_list[0]["id"], past.event.id);
    assert_eq!(past_list[0]["attendance_count"], 1);

    let (status, single) = app.send_json("GET", &format!("/api/v1/events/{}", past.event.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["id"], past.event.id);
    assert_eq!(single["attendance_count"], 1);

    let by_token = format!("/api/v1/events/by-token/{}", past.event.checkin_token);
    let (status, resolved) = app.send_json("GET", &by_token, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["id"], past.event.id);
    assert_eq!(resolved["attendance_count"], 1);
    assert!(resolved.get("checkin_token").is_none());
}

#[tokio::test]
async fn test_active_role_header_selects_view_but_never_grants() {
    let app = TestApp::new().await;
    let dual = app.seed_user("dual@example.com", "Dual", &[Role::Organizer, Role::Attendee]).await;
    let attendee = app.seed_user("a@example.com", "Ann", &[Role::Attendee]).await;

    let token = app.token_for(dual.id());

    let response = app.send("GET", "/api/v1/dashboard", Some(&token), None, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body(response).await["view"], "organizer");

    let response = app.send("GET", "/api/v1/dashboard", Some(&token), None, &[("X-Active-Role", "attendee")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["view"], "attendee");
    assert!(body["series"].as_array().unwrap().is_empty());

    let attendee_token = app.token_for(attendee.id());
    let response = app.send("GET", "/api/v1/dashboard", Some(&attendee_token), None, &[("X-Active-Role", "admin")]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send("GET", "/api/v1/events/mine/upcoming", Some(&attendee_token), None, &[("X-Active-Role", "organizer")]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send("GET", "/api/v1/dashboard", Some(&attendee_token), None, &[("X-Active-Role", "superuser")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

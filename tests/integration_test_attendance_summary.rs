mod common;

use axum::http::StatusCode;
use attendance_backend::domain::models::{event::Event, user::{Identity, Role}};
use attendance_backend::domain::services::checkin::CheckInAttempt;
use chrono::{Duration, Utc};
use common::{series_draft, utc, TestApp};

async fn attend(app: &TestApp, session: &Event, who: &Identity) {
    app.state.checkin_service.check_in(CheckInAttempt {
        token: session.checkin_token.clone(),
        attendee_id: who.id().to_string(),
        now: session.start_time,
        source_ip: None,
        user_agent: None,
    }).await.expect("check-in inside the window");
}

#[tokio::test]
async fn test_mon_wed_series_summary_mid_way() {
    let app = TestApp::new().await;
    let organizer = app.seed_user("org@example.com", "Olga", &[Role::Organizer]).await;
    let member = app.seed_user("m@example.com", "Mia", &[Role::Attendee]).await;

    let created = app.create_event(
        &organizer,
        series_draft("Yoga", "2025-01-06T10:00", "2025-01-06T11:00", &["Mon", "Wed"], "2025-01-17", None, vec![member.id().to_string()]),
    ).await;
    assert_eq!(created.sessions.len(), 4);

    // Jan 6 and Jan 13
    attend(&app, &created.sessions[0], &member).await;
    attend(&app, &created.sessions[2], &member).await;

    let now = utc("2025-01-10T12:00:00Z");
    let summary = app.state.attendance_service.summary_for_member(&created.event.id, member.id(), now).await.unwrap();

    assert_eq!(summary.total_past_sessions, 2);
    assert_eq!(summary.attended, 1);
    assert_eq!(summary.missed, 1);
    assert!(!summary.flagged);
    assert_eq!(summary.next_session.as_ref().unwrap().id, created.sessions[2].id);
    assert_eq!(summary.previous_session.as_ref().unwrap().id, created.sessions[1].id);
    assert!(summary.past_sessions[0].attended);
    assert!(!summary.past_sessions[1].attended);
}

#[tokio::test]
async fn test_threshold_flagging() {
    let app = TestApp::new().await;
    let organizer = app.seed_user("org@example.com", "Olga", &[Role::Organizer]).await;
    let member = app.seed_user("m@example.com", "Mia", &[Role::Attendee]).await;
    let members = vec![member.id().to_string()];

    // Five Mondays: Jan 6 .. Feb 3
    let lenient = app.create_event(
        &organizer,
        series_draft("Lenient", "2025-01-06T10:00", "2025-01-06T11:00", &["Mon"], "2025-02-03", Some(2), members.clone()),
    ).await;
    let strict = app.create_event(
        &organizer,
        series_draft("Strict", "2025-01-06T18:00", "2025-01-06T19:00", &["Mon"], "2025-02-03", Some(1), members),
    ).await;
    assert_eq!(lenient.sessions.len(), 5);

    for session in lenient.sessions.iter().take(3).chain(strict.sessions.iter().take(3)) {
        attend(&app, session, &member).await;
    }

    let now = utc("2025-02-10T00:00:00Z");
    let svc = &app.state.attendance_service;

    let s = svc.summary_for_member(&lenient.event.id, member.id(), now).await.unwrap();
    assert_eq!((s.total_past_sessions, s.attended, s.missed), (5, 3, 2));
    assert!(!s.flagged);

    let s = svc.summary_for_member(&strict.event.id, member.id(), now).await.unwrap();
    assert_eq!((s.total_past_sessions, s.attended, s.missed), (5, 3, 2));
    assert!(s.flagged);
    assert!(s.next_session.is_none());
}

#[tokio::test]
async fn test_family_view_and_summary_endpoint() {
    let app = TestApp::new().await;
    let organizer = app.seed_user("org@example.com", "Olga", &[Role::Organizer]).await;
    let ann = app.seed_user("ann@example.com", "Ann", &[Role::Attendee]).await;
    let bob = app.seed_user("bob@example.com", "Bob", &[Role::Attendee]).await;
    let outsider = app.seed_user("out@example.com", "Out", &[Role::Attendee]).await;

    // Daily sessions: three finished, the rest upcoming.
    let anchor = Utc::now() + Duration::hours(2);
    let first = anchor - Duration::days(3);
    let start = first.format("%Y-%m-%dT%H:%M").to_string();
    let end = (first + Duration::minutes(30)).format("%Y-%m-%dT%H:%M").to_string();
    let until = (anchor + Duration::days(3)).date_naive().to_string();
    let created = app.create_event(
        &organizer,
        series_draft(
            "Daily standup",
            &start,
            &end,
            &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            &until,
            Some(1),
            vec![ann.id().to_string(), bob.id().to_string()],
        ),
    ).await;
    assert_eq!(created.sessions.len(), 7);

    for session in created.sessions.iter().take(3) {
        attend(&app, session, &ann).await;
    }
    attend(&app, &created.sessions[0], &bob).await;

    let org_token = app.token_for(organizer.id());
    let (status, family) = app.send_json("GET", &format!("/api/v1/events/{}/family", created.event.id), Some(&org_token), None).await;
    assert_eq!(status, StatusCode::OK, "body: {}", family);
    assert_eq!(family["total_past_sessions"], 3);
    assert_eq!(family["past_children"].as_array().unwrap().len(), 3);
    assert_eq!(family["past_children"][0]["id"], created.sessions[2].id);
    assert_eq!(family["upcoming_children"][0]["id"], created.sessions[3].id);

    let members = family["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["name"], "Ann");
    assert_eq!(members[0]["attended"], 3);
    assert_eq!(members[0]["missed"], 0);
    assert_eq!(members[0]["is_flagged"], false);
    assert_eq!(members[1]["name"], "Bob");
    assert_eq!(members[1]["missed"], 2);
    assert_eq!(members[1]["is_flagged"], true);

    let (status, summary) = app.send_json("GET", &format!("/api/v1/events/{}/summary", created.event.id), Some(&app.token_for(bob.id())), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["attended"], 1);
    assert_eq!(summary["flagged"], true);
    assert_eq!(summary["next_session"]["id"], created.sessions[3].id);

    let uri = format!("/api/v1/events/{}/summary?member_id={}", created.event.id, ann.id());
    let (status, _) = app.send_json("GET", &uri, Some(&app.token_for(bob.id())), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, summary) = app.send_json("GET", &uri, Some(&org_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["member_id"], ann.id());

    let (status, _) = app.send_json("GET", &format!("/api/v1/events/{}/summary", created.event.id), Some(&app.token_for(outsider.id())), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/events/{}/summary?member_id={}", created.event.id, outsider.id());
    let (status, body) = app.send_json("GET", &uri, Some(&org_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = app.send_json("GET", &format!("/api/v1/events/{}/family", created.event.id), Some(&app.token_for(ann.id())), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send_json("GET", &format!("/api/v1/events/{}/family", created.sessions[0].id), Some(&org_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "body: {}", body);
}

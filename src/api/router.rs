use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, event, checkin, dashboard, user};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Users & Roles
        .route("/api/v1/users/me", get(user::get_me))
        .route("/api/v1/users", get(user::list_users).post(user::create_user))
        .route("/api/v1/users/{user_id}", delete(user::delete_user))
        .route("/api/v1/users/{user_id}/roles", post(user::grant_role))
        .route("/api/v1/users/{user_id}/roles/{role}", delete(user::revoke_role))

        // Events
        .route("/api/v1/events", post(event::create_event))
        .route("/api/v1/events/mine/upcoming", get(event::list_my_upcoming))
        .route("/api/v1/events/mine/past", get(event::list_my_past))
        .route("/api/v1/events/by-token/{token}", get(event::get_event_by_token))
        .route("/api/v1/events/{event_id}", get(event::get_event).delete(event::delete_event))
        .route("/api/v1/events/{event_id}/attendees", get(event::list_attendees))
        .route("/api/v1/events/{event_id}/attendance.csv", get(event::export_attendance_csv))

        // Series
        .route("/api/v1/events/{event_id}/family", get(event::get_series_family))
        .route("/api/v1/events/{event_id}/summary", get(event::get_series_summary))

        // Check-in
        .route("/api/v1/events/checkin", post(checkin::check_in))
        .route("/api/v1/events/my-checkins", get(checkin::list_my_checkins))

        .route("/api/v1/dashboard", get(dashboard::get_dashboard))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        active_role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}

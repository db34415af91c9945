use std::sync::Arc;
use crate::domain::ports::{AttendanceRepository, EventRepository, UserRepository};
use crate::domain::services::{
    aggregator::AttendanceService,
    checkin::CheckInService,
    dashboard::DashboardService,
    event_service::{EventDefaults, EventService},
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub event_service: Arc<EventService>,
    pub checkin_service: Arc<CheckInService>,
    pub attendance_service: Arc<AttendanceService>,
    pub dashboard_service: Arc<DashboardService>,
}

impl AppState {
    pub fn new(
        config: Config,
        user_repo: Arc<dyn UserRepository>,
        event_repo: Arc<dyn EventRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
    ) -> Self {
        let defaults = EventDefaults {
            checkin_open_minutes: config.default_checkin_open_minutes,
            timezone: config.default_timezone.clone(),
            max_series_sessions: config.max_series_sessions,
        };

        let event_service = Arc::new(EventService::new(event_repo.clone(), user_repo.clone(), defaults));
        let checkin_service = Arc::new(CheckInService::new(event_repo.clone(), attendance_repo.clone()));
        let attendance_service = Arc::new(AttendanceService::new(
            event_repo.clone(),
            attendance_repo.clone(),
            user_repo.clone(),
        ));
        let dashboard_service = Arc::new(DashboardService::new(
            event_repo.clone(),
            attendance_repo.clone(),
            attendance_service.clone(),
        ));

        Self {
            config,
            user_repo,
            event_repo,
            attendance_repo,
            event_service,
            checkin_service,
            attendance_service,
            dashboard_service,
        }
    }
}

use std::sync::Arc;
use tracing::{info, warn};
use sqlx::types::Json;
use crate::domain::models::{
    event::{Event, NewEventParams},
    user::{Identity, Role},
};
use crate::domain::ports::{EventRepository, UserRepository};
use crate::domain::services::{
    recurrence::{self, SeriesDefinition},
    time::{parse_date, parse_timezone, parse_wall_clock},
    token::generate_checkin_token,
};
use crate::error::AppError;

const MAX_TOKEN_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct EventDefaults {
    pub checkin_open_minutes: i32,
    pub timezone: String,
    pub max_series_sessions: usize,
}

/// Event creation input as submitted; times are local wall clock in
/// `timezone` unless they carry an offset.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub name: String,
    pub location: String,
    pub notes: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub timezone: Option<String>,
    pub checkin_open_minutes: Option<i32>,
    pub recurring: bool,
    pub weekdays: Vec<String>,
    pub end_date: Option<String>,
    pub attendance_threshold: Option<i32>,
    pub member_ids: Vec<String>,
}

#[derive(Debug)]
pub struct CreatedEvent {
    pub event: Event,
    pub sessions: Vec<Event>,
}

/// Admins manage everything; organizers manage what they own.
pub fn ensure_can_manage(identity: &Identity, event: &Event) -> Result<(), AppError> {
    if identity.is_admin() || event.organizer_id == identity.id() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not the organizer of this event".into()))
    }
}

pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
    user_repo: Arc<dyn UserRepository>,
    defaults: EventDefaults,
}

impl EventService {
    pub fn new(event_repo: Arc<dyn EventRepository>, user_repo: Arc<dyn UserRepository>, defaults: EventDefaults) -> Self {
        Self { event_repo, user_repo, defaults }
    }

    pub async fn create_event(&self, organizer: &Identity, draft: EventDraft) -> Result<CreatedEvent, AppError> {
        if !organizer.has_any_role(&[Role::Organizer, Role::Admin]) {
            return Err(AppError::Forbidden("Organizer or admin role required".into()));
        }

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Event name must not be empty".into()));
        }

        let tz_name = draft.timezone.clone().unwrap_or_else(|| self.defaults.timezone.clone());
        let tz = parse_timezone(&tz_name)?;
        let start_time = parse_wall_clock(&draft.start_time, &tz)?;
        let end_time = parse_wall_clock(&draft.end_time, &tz)?;
        if start_time >= end_time {
            return Err(AppError::Validation("Start time must be before end time".into()));
        }

        let checkin_open_minutes = draft.checkin_open_minutes.unwrap_or(self.defaults.checkin_open_minutes);
        if checkin_open_minutes < 0 {
            return Err(AppError::Validation("checkin_open_minutes must not be negative".into()));
        }

        let template = NewEventParams {
            name,
            location: draft.location.trim().to_string(),
            notes: draft.notes.clone().filter(|n| !n.trim().is_empty()),
            start_time,
            end_time,
            timezone: tz.name().to_string(),
            checkin_open_minutes,
            checkin_token: String::new(),
            organizer_id: organizer.id().to_string(),
        };

        if !draft.recurring {
            if !draft.member_ids.is_empty() {
                return Err(AppError::Validation("member_ids are only supported on recurring events".into()));
            }
            return self.persist(&template, None, &[]).await;
        }

        let weekdays = recurrence::parse_weekdays(&draft.weekdays)?;
        let end_date = draft
            .end_date
            .as_deref()
            .ok_or_else(|| AppError::Validation("Recurring events need an end_date".into()))
            .and_then(parse_date)?;

        if let Some(threshold) = draft.attendance_threshold
            && threshold < 0
        {
            return Err(AppError::Validation("attendance_threshold must not be negative".into()));
        }

        let definition = SeriesDefinition {
            first_start: start_time.with_timezone(&tz).naive_local(),
            first_end: end_time.with_timezone(&tz).naive_local(),
            weekdays,
            recurring_until: end_date,
            timezone: tz,
        };
        let slots = recurrence::expand(&definition, self.defaults.max_series_sessions)?;

        let member_ids = self.resolve_members(&draft.member_ids).await?;

        let series = SeriesTemplate {
            definition,
            threshold: draft.attendance_threshold,
            slots,
        };
        self.persist(&template, Some(&series), &member_ids).await
    }

    /// Deduplicates and checks that every member exists.
    async fn resolve_members(&self, ids: &[String]) -> Result<Vec<String>, AppError> {
        let mut member_ids: Vec<String> = ids.iter().map(|id| id.trim().to_string()).collect();
        member_ids.sort();
        member_ids.dedup();

        let found = self.user_repo.find_many(&member_ids).await?;
        if found.len() != member_ids.len() {
            let missing: Vec<&str> = member_ids
                .iter()
                .filter(|id| !found.iter().any(|u| &u.id == *id))
                .map(String::as_str)
                .collect();
            return Err(AppError::Validation(format!("Unknown member ids: {}", missing.join(", "))));
        }
        Ok(member_ids)
    }

    /// Builds fresh rows and tokens per attempt; a token collision rolls the
    /// whole series back and is retried.
    async fn persist(
        &self,
        template: &NewEventParams,
        series: Option<&SeriesTemplate>,
        member_ids: &[String],
    ) -> Result<CreatedEvent, AppError> {
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let mut head = Event::new(NewEventParams {
                checkin_token: generate_checkin_token(),
                ..template.clone()
            });

            let sessions: Vec<Event> = match series {
                Some(series) => {
                    head.recurring = true;
                    head.weekdays = Some(Json(series.definition.weekdays.clone()));
                    head.recurring_until = Some(series.definition.recurring_until);
                    head.attendance_threshold = series.threshold;
                    series
                        .slots
                        .iter()
                        .map(|slot| Event::child_of(&head, slot.start_time, slot.end_time, generate_checkin_token()))
                        .collect()
                }
                None => Vec::new(),
            };

            match self.event_repo.create_series(&head, &sessions, member_ids).await {
                Ok(event) => {
                    info!(
                        event_id = %event.id,
                        recurring = event.recurring,
                        sessions = sessions.len(),
                        members = member_ids.len(),
                        "Event created"
                    );
                    return Ok(CreatedEvent { event, sessions });
                }
                Err(AppError::TokenCollision) => {
                    warn!(attempt, "Check-in token collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::TokenCollision)
    }

    pub async fn delete_event(&self, identity: &Identity, event_id: &str) -> Result<(), AppError> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
        ensure_can_manage(identity, &event)?;

        self.event_repo.delete(event_id).await?;
        info!(event_id = %event_id, deleted_by = %identity.id(), "Event deleted");
        Ok(())
    }
}

struct SeriesTemplate {
    definition: SeriesDefinition,
    threshold: Option<i32>,
    slots: Vec<recurrence::SessionSlot>,
}

pub mod aggregator;
pub mod checkin;
pub mod dashboard;
pub mod event_service;
pub mod export;
pub mod recurrence;
pub mod time;
pub mod token;

pub mod attendance;
pub mod auth;
pub mod event;
pub mod summary;
pub mod user;

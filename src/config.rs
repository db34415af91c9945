use std::env;

/// Upper bound accepted for `MAX_SERIES_SESSIONS`.
pub const SERIES_SESSION_HARD_CAP: usize = 2000;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub default_checkin_open_minutes: i32,
    pub default_timezone: String,
    pub max_series_sessions: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set (HS256 secret shared with the identity provider)"),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "attendance-frontend".to_string()),
            default_checkin_open_minutes: env::var("DEFAULT_CHECKIN_OPEN_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("DEFAULT_CHECKIN_OPEN_MINUTES must be a number"),
            default_timezone: env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string()),
            max_series_sessions: env::var("MAX_SERIES_SESSIONS")
                .unwrap_or_else(|_| "500".to_string())
                .parse::<usize>()
                .expect("MAX_SERIES_SESSIONS must be a number")
                .clamp(1, SERIES_SESSION_HARD_CAP),
        }
    }
}

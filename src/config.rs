use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub seed_sample_bookings: bool,
    pub session_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "bookings.db".to_string()),
            seed_sample_bookings: env::var("SEED_SAMPLE_BOOKINGS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(30),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

use std::time::Duration;

use dailystory_core::scheduling::parse_time_of_day;
use dailystory_pipeline::orchestrator::DEFAULT_SOURCE;
use dailystory_pipeline::retry::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS};
use dailystory_pipeline::{DailySchedule, Recurrence, RetryPolicy};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Covers on-demand
    /// generation of today's story, retries included.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background work (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Mount `/api/v1/dev/*` routes (default: `false`).
    pub enable_dev_routes: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `ENABLE_DEV_ROUTES`    | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let enable_dev_routes = env_flag("ENABLE_DEV_ROUTES", false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            enable_dev_routes,
        }
    }
}

/// Daily generation settings.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Run the daily scheduler in this process.
    pub enabled: bool,
    pub schedule: DailySchedule,
    pub retry: RetryPolicy,
    /// Provider tag stored on generated stories.
    pub source: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: DailySchedule::default(),
            retry: RetryPolicy::default(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl ScheduleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default       |
    /// |---------------------------------|---------------|
    /// | `ENABLE_SCHEDULER`              | `true`        |
    /// | `DAILY_GENERATION_TIME`         | `00:00` (UTC) |
    /// | `SCHEDULE_RECURRENCE`           | `wall_clock`  |
    /// | `GENERATION_MAX_ATTEMPTS`       | `3`           |
    /// | `GENERATION_RETRY_INITIAL_SECS` | `10`          |
    /// | `GENERATION_RETRY_MAX_SECS`     | unset         |
    /// | `STORY_SOURCE`                  | `OpenRouter`  |
    pub fn from_env() -> Self {
        let enabled = env_flag("ENABLE_SCHEDULER", true);

        let target = parse_time_of_day(
            &std::env::var("DAILY_GENERATION_TIME").unwrap_or_else(|_| "00:00".into()),
        )
        .expect("DAILY_GENERATION_TIME must be HH:MM or HH:MM:SS");

        let recurrence: Recurrence = std::env::var("SCHEDULE_RECURRENCE")
            .unwrap_or_else(|_| "wall_clock".into())
            .parse()
            .expect("SCHEDULE_RECURRENCE must be wall_clock or fixed_period");

        let max_attempts: u32 = std::env::var("GENERATION_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .expect("GENERATION_MAX_ATTEMPTS must be a valid u32");

        let initial_delay_secs: u64 = std::env::var("GENERATION_RETRY_INITIAL_SECS")
            .unwrap_or_else(|_| DEFAULT_INITIAL_DELAY.as_secs().to_string())
            .parse()
            .expect("GENERATION_RETRY_INITIAL_SECS must be a valid u64");

        let max_delay = std::env::var("GENERATION_RETRY_MAX_SECS").ok().map(|v| {
            Duration::from_secs(
                v.parse()
                    .expect("GENERATION_RETRY_MAX_SECS must be a valid u64"),
            )
        });

        let source = std::env::var("STORY_SOURCE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.into());

        Self {
            enabled,
            schedule: DailySchedule::new(target).with_recurrence(recurrence),
            retry: RetryPolicy {
                max_attempts,
                initial_delay: Duration::from_secs(initial_delay_secs),
                max_delay,
            },
            source,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => parse_flag(&v).unwrap_or_else(|| panic!("{name} must be true or false")),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

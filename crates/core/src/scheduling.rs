//! Daily trigger arithmetic.
//!
//! All times are UTC. A daily trigger fires at a fixed time-of-day; when the
//! process starts after today's trigger time the occurrence is treated as
//! already due, and the next timed fire is tomorrow's.

use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Fixed recurrence period of the daily trigger.
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the next timed fire lands relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextTrigger {
    /// Today's occurrence has already passed and should run right away.
    pub due_now: bool,
    /// Instant of the next timed fire. Always strictly after `now`.
    pub at: Timestamp,
    /// `at - now`, never zero.
    pub delay: Duration,
}

/// Compute the next timed fire for a daily trigger at `target` (UTC).
///
/// At or after today's target, `due_now` is set and the next fire is
/// tomorrow's target. Before it, the next fire is today's target.
pub fn next_trigger(now: Timestamp, target: NaiveTime) -> NextTrigger {
    let todays = now.date_naive().and_time(target).and_utc();
    let (due_now, at) = if now >= todays {
        (true, todays + TimeDelta::days(1))
    } else {
        (false, todays)
    };

    NextTrigger {
        due_now,
        at,
        delay: delay_until(now, at),
    }
}

/// Time from `now` until `at`, at least one millisecond.
pub fn delay_until(now: Timestamp, at: Timestamp) -> Duration {
    (at - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
        .max(Duration::from_millis(1))
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CoreError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| {
            CoreError::Validation(format!("Invalid time of day '{raw}'. Use HH:MM or HH:MM:SS"))
        })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn before_target_fires_today() {
        let next = next_trigger(at("2025-04-21T05:30:00Z"), time(6, 0));
        assert!(!next.due_now);
        assert_eq!(next.at, at("2025-04-21T06:00:00Z"));
        assert_eq!(next.delay, Duration::from_secs(30 * 60));
    }

    #[test]
    fn after_target_is_due_and_arms_tomorrow() {
        let next = next_trigger(at("2025-04-21T09:15:00Z"), time(6, 0));
        assert!(next.due_now);
        assert_eq!(next.at, at("2025-04-22T06:00:00Z"));
        assert_eq!(next.delay, Duration::from_secs(20 * 3600 + 45 * 60));
    }

    #[test]
    fn exactly_at_target_is_due() {
        let next = next_trigger(at("2025-04-21T06:00:00Z"), time(6, 0));
        assert!(next.due_now);
        assert_eq!(next.delay, DAY);
    }

    #[test]
    fn midnight_target_is_always_due() {
        let next = next_trigger(at("2025-04-21T00:00:01Z"), time(0, 0));
        assert!(next.due_now);
        assert_eq!(next.at, at("2025-04-22T00:00:00Z"));
    }

    #[test]
    fn crosses_month_boundary() {
        let next = next_trigger(at("2025-04-30T23:00:00Z"), time(12, 0));
        assert_eq!(next.at, at("2025-05-01T12:00:00Z"));
    }

    #[test]
    fn delay_is_never_zero() {
        let now = at("2025-04-21T06:00:00Z");
        assert_eq!(delay_until(now, now), Duration::from_millis(1));
        assert_eq!(
            delay_until(now, at("2025-04-21T05:00:00Z")),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn parses_time_of_day() {
        assert_eq!(parse_time_of_day("06:30").unwrap(), time(6, 30));
        assert_eq!(
            parse_time_of_day("23:59:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59).unwrap()
        );
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
    }
}

//! Wall-clock abstraction.
//!
//! "Today" and the daily trigger are both derived from a [`Clock`] so tests
//! can pin or advance time deterministically.

use std::fmt;

use chrono::Utc;

use crate::types::{StoryDate, Timestamp};

pub trait Clock: Send + Sync + fmt::Debug {
    /// Current UTC time.
    fn now(&self) -> Timestamp;

    /// Current UTC calendar date.
    fn today(&self) -> StoryDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

//! Daily story generation pipeline.
//!
//! - [`retry`]: bounded exponential backoff around a single generation.
//! - [`orchestrator`]: get-or-create of today's story on top of a
//!   [`StoryStore`](dailystory_core::store::StoryStore).
//! - [`scheduler`]: fires the orchestrator once a day at a UTC time.
//! - [`memory`]: in-process store with the same uniqueness guarantee.

pub mod memory;
pub mod orchestrator;
pub mod retry;
pub mod scheduler;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use memory::MemoryStoryStore;
pub use orchestrator::{StoryError, StoryOrigin, StoryService, TodayStory};
pub use retry::{RetryError, RetryPolicy};
pub use scheduler::{DailySchedule, DailyScheduler, Recurrence, SchedulerError};

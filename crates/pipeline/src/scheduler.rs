//! Once-a-day trigger for [`StoryService::get_or_create_for_today`].
//!
//! The scheduler owns a single background loop. On start it computes the
//! next occurrence of the configured UTC time-of-day; if today's occurrence
//! has already passed, the loop runs the trigger immediately before arming
//! the timer for tomorrow. Each run executes in its own task so a failure or
//! panic is logged and never stops the timer.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveTime, TimeDelta};
use dailystory_core::error::CoreError;
use dailystory_core::scheduling::{delay_until, next_trigger, DAY};
use dailystory_core::types::Timestamp;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::StoryService;

/// How the delay to the next fire is derived after a trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Recurrence {
    /// Recompute against the wall clock on every fire, so the trigger
    /// stays pinned to the configured time-of-day.
    #[default]
    WallClock,
    /// Add exactly 24 hours of monotonic time after each fire.
    FixedPeriod,
}

impl FromStr for Recurrence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wall_clock" => Ok(Self::WallClock),
            "fixed_period" => Ok(Self::FixedPeriod),
            other => Err(CoreError::Validation(format!(
                "Unknown schedule recurrence '{other}'. Use wall_clock or fixed_period"
            ))),
        }
    }
}

/// When the daily trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    /// UTC time of day.
    pub target: NaiveTime,
    pub recurrence: Recurrence,
}

impl DailySchedule {
    pub fn new(target: NaiveTime) -> Self {
        Self {
            target,
            recurrence: Recurrence::default(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }
}

impl Default for DailySchedule {
    /// Midnight UTC.
    fn default() -> Self {
        Self::new(NaiveTime::MIN)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Daily scheduler has already been started")]
    AlreadyStarted,
}

#[derive(Debug)]
enum State {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// Fires the daily story generation at a fixed UTC time.
///
/// Lifecycle is `Idle -> Running -> Stopped`; a scheduler cannot be
/// restarted once it has been started.
pub struct DailyScheduler {
    service: Arc<StoryService>,
    schedule: DailySchedule,
    state: Mutex<State>,
}

impl DailyScheduler {
    pub fn new(service: Arc<StoryService>, schedule: DailySchedule) -> Self {
        Self {
            service,
            schedule,
            state: Mutex::new(State::Idle),
        }
    }

    pub fn schedule(&self) -> DailySchedule {
        self.schedule
    }

    /// Spawn the trigger loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.lock_state();
        if !matches!(*state, State::Idle) {
            tracing::warn!("Daily scheduler start requested but it was already started");
            return Err(SchedulerError::AlreadyStarted);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&self.service),
            self.schedule,
            cancel.clone(),
        ));
        *state = State::Running { cancel, handle };
        Ok(())
    }

    /// Disarm the timer.
    ///
    /// Returns the loop's handle, which completes once any in-flight run has
    /// finished. `None` when the scheduler was not running.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, State::Stopped) {
            State::Running { cancel, handle } => {
                cancel.cancel();
                Some(handle)
            }
            State::Idle => {
                *state = State::Idle;
                None
            }
            State::Stopped => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_state(), State::Running { .. })
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        if let State::Running { cancel, .. } = &*self.lock_state() {
            cancel.cancel();
        }
    }
}

/// The scheduler loop. Runs until `cancel` fires.
async fn run(service: Arc<StoryService>, schedule: DailySchedule, cancel: CancellationToken) {
    let clock = service.clock();
    let first = next_trigger(clock.now(), schedule.target);

    tracing::info!(
        target_time = %schedule.target,
        recurrence = ?schedule.recurrence,
        next_fire = %first.at,
        due_now = first.due_now,
        "Daily scheduler started",
    );

    if first.due_now {
        tracing::info!("Today's trigger time has passed, generating now");
        fire(&service).await;
    }

    let mut at: Timestamp = first.at;
    let mut deadline = Instant::now() + delay_until(clock.now(), at);

    'timer: loop {
        if !sleep_or_cancel(&cancel, deadline).await {
            break;
        }

        if schedule.recurrence == Recurrence::WallClock {
            // The wall clock can trail the monotonic timer after a step back.
            // Firing early would generate under yesterday's date.
            let mut now = clock.now();
            while now < at {
                tracing::debug!(%now, scheduled_for = %at, "Wall clock behind trigger, holding");
                if !sleep_or_cancel(&cancel, Instant::now() + delay_until(now, at)).await {
                    break 'timer;
                }
                now = clock.now();
            }
        }

        tracing::info!(scheduled_for = %at, "Daily trigger fired");
        fire(&service).await;

        (at, deadline) = match schedule.recurrence {
            Recurrence::FixedPeriod => (at + TimeDelta::days(1), deadline + DAY),
            Recurrence::WallClock => {
                let now = clock.now();
                let next = next_trigger(now, schedule.target);
                (next.at, Instant::now() + delay_until(now, next.at))
            }
        };
        tracing::debug!(next_fire = %at, "Daily trigger re-armed");
    }

    tracing::info!("Daily scheduler stopping");
}

/// Sleep until `deadline`. Returns `false` if `cancel` fires first.
async fn sleep_or_cancel(cancel: &CancellationToken, deadline: Instant) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep_until(deadline) => true,
    }
}

/// Run one get-or-create in its own task and log the outcome.
///
/// The run gets a fresh cancellation token so stopping the scheduler never
/// aborts a generation half-way.
async fn fire(service: &Arc<StoryService>) {
    let service = Arc::clone(service);
    let task = tokio::spawn(async move {
        service
            .get_or_create_for_today_with_origin(&CancellationToken::new())
            .await
    });

    match task.await {
        Ok(Ok(today)) => tracing::info!(
            story_id = today.story.id,
            date = %today.story.date,
            origin = ?today.origin,
            "Daily story ready",
        ),
        Ok(Err(e)) => tracing::error!(error = %e, "Daily story generation failed"),
        Err(e) if e.is_panic() => tracing::error!(error = %e, "Daily story generation panicked"),
        Err(e) => tracing::error!(error = %e, "Daily story generation task aborted"),
    }
}

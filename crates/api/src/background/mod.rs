//! Background tasks owned by the API process.
//!
//! The only one is the daily story scheduler. [`start_daily_scheduler`]
//! arms it from configuration and [`stop_daily_scheduler`] disarms it
//! during graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use dailystory_pipeline::{DailyScheduler, StoryService};

use crate::config::ScheduleConfig;

/// Start the daily scheduler unless disabled by configuration.
pub fn start_daily_scheduler(
    service: Arc<StoryService>,
    config: &ScheduleConfig,
) -> Option<DailyScheduler> {
    if !config.enabled {
        tracing::info!("Daily scheduler disabled (ENABLE_SCHEDULER=false)");
        return None;
    }

    let scheduler = DailyScheduler::new(service, config.schedule);
    if let Err(e) = scheduler.start() {
        tracing::error!(error = %e, "Daily scheduler failed to start");
        return None;
    }
    Some(scheduler)
}

/// Disarm the scheduler and wait up to `timeout` for an in-flight run.
pub async fn stop_daily_scheduler(scheduler: &DailyScheduler, timeout: Duration) {
    let Some(handle) = scheduler.stop() else {
        return;
    };

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => tracing::info!("Daily scheduler stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Daily scheduler task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Daily scheduler did not stop in time, abandoning in-flight run",
        ),
    }
}

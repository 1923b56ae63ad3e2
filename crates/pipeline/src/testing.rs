//! Test doubles for the orchestrator and scheduler.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dailystory_core::clock::Clock;
use dailystory_core::generation::{GenerationError, GenerationRequest, StoryGenerator};
use dailystory_core::story::StoryDraft;
use dailystory_core::types::Timestamp;
use tokio::sync::Barrier;
use tokio::time::Instant;

/// What a [`ScriptedGenerator`] does on a given call.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail,
    /// Return a draft whose title is blank.
    Blank,
    Panic,
}

/// Generator that follows a script, then repeats a fallback step.
///
/// Successful calls return `Story #<n>` where `n` is the 1-based call number.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Mutex<Vec<Step>>,
    fallback: Step,
    calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
    barrier: Option<Arc<Barrier>>,
}

impl ScriptedGenerator {
    fn with(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script),
            fallback,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
            barrier: None,
        }
    }

    /// Every call succeeds.
    pub fn succeeding() -> Self {
        Self::with(Vec::new(), Step::Succeed)
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::with(Vec::new(), Step::Fail)
    }

    /// The first `n` calls fail, the rest succeed.
    pub fn failing_times(n: usize) -> Self {
        Self::with(vec![Step::Fail; n], Step::Succeed)
    }

    /// Run `script` in order, then `fallback` forever.
    pub fn scripted(script: Vec<Step>, fallback: Step) -> Self {
        Self::with(script, fallback)
    }

    /// Hold every call at `barrier` before answering.
    pub fn gated(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tokio instants at which each call started.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times
            .lock()
            .map(|times| times.clone())
            .unwrap_or_default()
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        if script.is_empty() {
            self.fallback.clone()
        } else {
            script.remove(0)
        }
    }
}

#[async_trait]
impl StoryGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<StoryDraft, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut times) = self.call_times.lock() {
            times.push(Instant::now());
        }
        let step = self.next_step();

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        match step {
            Step::Succeed => Ok(StoryDraft {
                title: format!("Story #{call}"),
                content: format!("Generated on call {call}."),
            }),
            Step::Fail => Err(GenerationError::Api {
                status: 503,
                body: format!("scripted failure on call {call}"),
            }),
            Step::Blank => Ok(StoryDraft {
                title: "  ".into(),
                content: "No title.".into(),
            }),
            Step::Panic => panic!("scripted panic on call {call}"),
        }
    }
}

/// Wall clock that advances with tokio's (possibly paused) time.
///
/// Reports `base` at construction and moves forward by however much tokio
/// time has elapsed since, so `tokio::time::advance` and auto-advance in
/// `start_paused` tests move "today" along with the timers.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    base: Timestamp,
    origin: Instant,
}

impl TokioClock {
    pub fn starting_at(base: Timestamp) -> Self {
        Self {
            base,
            origin: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = chrono::TimeDelta::from_std(self.origin.elapsed()).unwrap_or_default();
        self.base + elapsed
    }
}

//! Get-or-create of today's story.
//!
//! [`StoryService::get_or_create_for_today`] is safe to call from any number
//! of tasks at once. It never holds a lock between the existence check and
//! the insert: the store's uniqueness constraint on the date decides the
//! winner, and losers re-read the winner's row.

use std::future::Future;
use std::sync::Arc;

use dailystory_core::clock::{Clock, SystemClock};
use dailystory_core::generation::{GenerationError, GenerationRequest, StoryGenerator};
use dailystory_core::pagination::PageRequest;
use dailystory_core::store::{InsertOutcome, StoreError, StoryStore};
use dailystory_core::story::{NewStory, Story};
use dailystory_core::types::StoryDate;
use tokio_util::sync::CancellationToken;

use crate::retry::{RetryError, RetryPolicy};

/// Provider tag stored on stories when none is configured.
pub const DEFAULT_SOURCE: &str = "OpenRouter";

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// Every generation attempt failed.
    #[error("Story generation failed after {attempts} attempts: {last}")]
    GenerationExhausted {
        attempts: u32,
        #[source]
        last: GenerationError,
    },

    /// The store failed for a reason other than a date collision.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// The store reported a collision but the colliding row cannot be read.
    #[error("Story for {date} collided on insert but was not found on re-read")]
    InconsistentState { date: StoryDate },

    /// The caller's cancellation token fired.
    #[error("Story request cancelled")]
    Cancelled,
}

impl From<RetryError> for StoryError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::Exhausted { attempts, last } => {
                StoryError::GenerationExhausted { attempts, last }
            }
            RetryError::Cancelled => StoryError::Cancelled,
        }
    }
}

/// How today's story was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryOrigin {
    /// Already stored before this call; no generation happened.
    Existing,
    /// Generated and inserted by this call.
    Created,
    /// Generated by this call, but a concurrent caller inserted first.
    /// The returned story is theirs.
    Concurrent,
}

/// Today's story plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayStory {
    pub story: Story,
    pub origin: StoryOrigin,
}

/// Orchestrates reads and daily creation of stories.
pub struct StoryService {
    store: Arc<dyn StoryStore>,
    generator: Arc<dyn StoryGenerator>,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    source: String,
    request: GenerationRequest,
}

impl StoryService {
    /// Service with the default retry policy, system clock and source tag.
    pub fn new(store: Arc<dyn StoryStore>, generator: Arc<dyn StoryGenerator>) -> Self {
        Self {
            store,
            generator,
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
            source: DEFAULT_SOURCE.to_string(),
            request: GenerationRequest::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tag recorded as `ai_source` on created stories.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Theme/model overrides passed to every generation call.
    pub fn with_request(mut self, request: GenerationRequest) -> Self {
        self.request = request;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Return today's story, generating and storing it if absent.
    pub async fn get_or_create_for_today(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Story, StoryError> {
        self.get_or_create_for_today_with_origin(cancel)
            .await
            .map(|today| today.story)
    }

    /// Like [`get_or_create_for_today`](Self::get_or_create_for_today), also
    /// reporting whether the story was found, created, or lost a race.
    pub async fn get_or_create_for_today_with_origin(
        &self,
        cancel: &CancellationToken,
    ) -> Result<TodayStory, StoryError> {
        let today = self.clock.today();
        tracing::debug!(%today, "Getting or creating today's story");

        if let Some(story) = cancellable(cancel, self.store.find_by_date(today)).await? {
            tracing::info!(%today, story_id = story.id, "Found today's story");
            return Ok(TodayStory {
                story,
                origin: StoryOrigin::Existing,
            });
        }

        tracing::info!(%today, "No story for today, generating");
        let draft = self
            .retry
            .execute(cancel, |attempt| {
                tracing::debug!(%today, attempt, "Generation attempt");
                async move {
                    let draft = self.generator.generate(&self.request).await?;
                    draft
                        .validate()
                        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
                    Ok(draft)
                }
            })
            .await?;

        let new_story = NewStory::from_draft(draft, today, &self.source);
        match cancellable(cancel, self.store.insert(new_story)).await? {
            InsertOutcome::Created(story) => {
                tracing::info!(%today, story_id = story.id, "Saved today's story");
                Ok(TodayStory {
                    story,
                    origin: StoryOrigin::Created,
                })
            }
            InsertOutcome::AlreadyExists => {
                tracing::info!(%today, "Another caller stored today's story first, re-reading");
                match cancellable(cancel, self.store.find_by_date(today)).await? {
                    Some(story) => Ok(TodayStory {
                        story,
                        origin: StoryOrigin::Concurrent,
                    }),
                    None => {
                        tracing::error!(
                            %today,
                            "Store reported a date collision but no story exists for the date",
                        );
                        Err(StoryError::InconsistentState { date: today })
                    }
                }
            }
        }
    }

    /// Story for a specific date, if any.
    pub async fn get_by_date(&self, date: StoryDate) -> Result<Option<Story>, StoryError> {
        let story = self.store.find_by_date(date).await?;
        match &story {
            Some(s) => tracing::debug!(%date, story_id = s.id, "Found story"),
            None => tracing::debug!(%date, "No story for date"),
        }
        Ok(story)
    }

    /// Most recent story by date, if any.
    pub async fn latest(&self) -> Result<Option<Story>, StoryError> {
        Ok(self.store.list(0, 1).await?.into_iter().next())
    }

    /// Page through stories, newest first.
    ///
    /// `page` is clamped to `>= 1` and `page_size` to `1..=50`.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Story>, StoryError> {
        let request = PageRequest::new(Some(page), Some(page_size));
        self.list_page(request).await
    }

    /// Page through stories with an already clamped request.
    pub async fn list_page(&self, request: PageRequest) -> Result<Vec<Story>, StoryError> {
        tracing::debug!(page = request.page, page_size = request.page_size, "Listing stories");
        let stories = self.store.list(request.offset(), request.limit()).await?;
        tracing::debug!(count = stories.len(), "Listed stories");
        Ok(stories)
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await.is_ok()
    }
}

/// Await a store call unless `cancel` fires first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoryError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoryError::Cancelled),
        result = fut => result.map_err(StoryError::from),
    }
}

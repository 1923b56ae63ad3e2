/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Stories are keyed by UTC calendar date.
pub type StoryDate = chrono::NaiveDate;

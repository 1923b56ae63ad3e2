//! Row structs matching database tables.
//!
//! Each row converts into its `dailystory_core` domain type so nothing
//! above this crate depends on sqlx.

pub mod story;

//! Daily story API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background scheduler wiring) so integration tests and the binary
//! entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

//! Web UI for Today I Learned.
//!
//! This crate provides:
//! - The feed state container (loaded facts, category filter, submission form)
//! - Per-visitor sessions so each browser gets its own feed
//! - A server-rendered page with the category sidebar, fact list and form
//! - Vote and submit actions that go through a [`til_store::FactStore`]

mod error;
mod routes;
pub mod session;
pub mod state;

pub use error::WebError;
pub use routes::{AppState, EMPTY_LIST_MESSAGE, create_router};
pub use session::{SESSION_COOKIE, Sessions};
pub use state::{Feed, FeedController, LoadStatus, SubmitOutcome};

//! Workly REST API
//!
//! This crate provides the Axum-based HTTP API for Workly: user and company
//! sessions, profiles, the job board, posts with comments and likes, follows
//! and job applications.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

//! API routes

mod applications;
mod auth;
mod comments;
mod companies;
mod health;
mod jobs;
mod likes;
pub mod metrics;
mod posts;
pub mod types;
mod users;

use axum::{Router, middleware::from_fn_with_state};
use std::sync::Arc;
use workly_auth::require_principal;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Gate every route in `router` behind the user session cookie
fn user_only(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.user_guard.clone(), require_principal))
}

/// Gate every route in `router` behind the company session cookie
fn company_only(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.company_guard.clone(), require_principal))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route".to_string())
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes(&state))
        .merge(users::routes(&state))
        .merge(companies::routes(&state))
        .merge(jobs::routes(&state))
        .merge(posts::routes(&state))
        .merge(comments::routes(&state))
        .merge(likes::routes(&state))
        .merge(applications::routes(&state))
        .fallback(not_found)
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

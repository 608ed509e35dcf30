//! Like routes

use axum::{Json, Router, extract::State, http::StatusCode, routing::{get, post}};
use workly_auth::CurrentUser;
use workly_db::Like;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, Deleted, LikeRequest};
use super::user_only;

/// POST /like
async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<LikeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Like>>), ApiError> {
    let post_id = validation::id("post_id", request.post_id)?;
    let like = state.db.insert_like(user.id, post_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(like).with_message("Post liked")),
    ))
}

/// DELETE /like
async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<LikeRequest>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_like(user.id, request.post_id).await? {
        return Err(ApiError::NotFound(format!("Like on post {}", request.post_id)));
    }

    Ok(Json(
        ApiResponse::data(Deleted { id: request.post_id }).with_message("Like removed"),
    ))
}

/// GET /likes/{post_id}
async fn list_likes(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<Like>>>, ApiError> {
    if state.db.get_post(post_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Post: {}", post_id)));
    }

    Ok(Json(ApiResponse::data(state.db.list_likes(post_id).await?)))
}

/// Create like routes
pub fn routes(state: &AppState) -> Router<AppState> {
    user_only(
        state,
        Router::new()
            .route("/like", post(like).delete(unlike))
            .route("/likes/{post_id}", get(list_likes)),
    )
}

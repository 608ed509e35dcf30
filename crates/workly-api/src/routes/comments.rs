//! Comment routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::info;
use workly_auth::CurrentUser;
use workly_db::Comment;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, CreateCommentRequest, Deleted};
use super::user_only;

/// POST /comment
async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), ApiError> {
    let post_id = validation::id("post_id", request.post_id)?;
    let content = validation::required("content", &request.content)?;

    let comment = state.db.insert_comment(user.id, post_id, &content).await?;
    info!("User {} commented on post {}", user.id, post_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(comment).with_message("Comment added")),
    ))
}

/// DELETE /comment/{comment_id}
async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(comment_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_comment(comment_id, user.id).await? {
        return Err(ApiError::NotFound(format!("Comment: {}", comment_id)));
    }

    Ok(Json(
        ApiResponse::data(Deleted { id: comment_id }).with_message("Comment deleted"),
    ))
}

/// GET /comments/{post_id}
async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<Comment>>>, ApiError> {
    if state.db.get_post(post_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Post: {}", post_id)));
    }

    Ok(Json(ApiResponse::data(state.db.list_comments(post_id).await?)))
}

/// Create comment routes. All of them require a user session.
pub fn routes(state: &AppState) -> Router<AppState> {
    user_only(
        state,
        Router::new()
            .route("/comment", post(create_comment))
            .route("/comment/{comment_id}", delete(delete_comment))
            .route("/comments/{post_id}", get(list_comments)),
    )
}

//! Post routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::info;
use workly_auth::CurrentUser;
use workly_db::{NewPost, Post, UpdatePost};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, CreatePostRequest, Deleted, UpdatePostRequest};
use super::user_only;

/// POST /post/create
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Post>>), ApiError> {
    let post = state
        .db
        .insert_post(NewPost {
            user_id: user.id,
            title: validation::name("title", &request.title)?,
            content: validation::required("content", &request.content)?,
        })
        .await?;

    info!("User {} created post {}", user.id, post.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(post).with_message("Post created")),
    ))
}

/// GET /post
async fn list_posts(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Post>>>, ApiError> {
    Ok(Json(ApiResponse::data(state.db.list_posts().await?)))
}

/// GET /post/get/{id}
async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let post = state
        .db
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post: {}", id)))?;

    Ok(Json(ApiResponse::data(post)))
}

/// GET /post/user/{user_id}
async fn posts_by_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<Post>>>, ApiError> {
    Ok(Json(ApiResponse::data(
        state.db.list_user_posts(user_id).await?,
    )))
}

/// PUT /post/update/{id}
async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let update = UpdatePost {
        title: request
            .title
            .as_deref()
            .map(|t| validation::name("title", t))
            .transpose()?,
        content: validation::optional("content", request.content.as_deref())?,
    };

    let post = state
        .db
        .update_post(id, user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post: {}", id)))?;

    info!("User {} updated post {}", user.id, post.id);

    Ok(Json(ApiResponse::data(post).with_message("Post updated")))
}

/// DELETE /post/delete/{id}
async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_post(id, user.id).await? {
        return Err(ApiError::NotFound(format!("Post: {}", id)));
    }

    info!("User {} deleted post {}", user.id, id);

    Ok(Json(ApiResponse::data(Deleted { id }).with_message("Post deleted")))
}

/// Create post routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/post", get(list_posts))
        .route("/post/get/{id}", get(get_post))
        .route("/post/user/{user_id}", get(posts_by_user));

    let protected = user_only(
        state,
        Router::new()
            .route("/post/create", post(create_post))
            .route("/post/update/{id}", put(update_post))
            .route("/post/delete/{id}", delete(delete_post)),
    );

    public.merge(protected)
}

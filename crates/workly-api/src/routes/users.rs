//! User profile and follow routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info};
use workly_auth::{CurrentUser, PrincipalKind, hash_password, removal_cookie};
use workly_db::{UpdateUser, User, UserFollow};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, Deleted, UpdateUserRequest};
use super::user_only;

/// Only the signed-in user may touch their own profile. Any other id reads as missing.
fn own_profile(user: &User, id: i64) -> Result<(), ApiError> {
    if user.id != id {
        return Err(ApiError::NotFound(format!("User: {}", id)));
    }
    Ok(())
}

// ==================== Profile Routes ====================

/// GET /user/get/{id}
async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(ApiResponse::data(user)))
}

/// PUT /user/update/{id}
async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    own_profile(&user, id)?;
    debug!("Updating user: {}", id);

    let name = request
        .name
        .as_deref()
        .map(|n| validation::name("name", n))
        .transpose()?;
    let email = request.email.as_deref().map(validation::email).transpose()?;
    let password_hash = match &request.password {
        Some(password) => {
            validation::password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = state
        .db
        .update_user(
            id,
            UpdateUser {
                name,
                email,
                password_hash,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated user {}", user.id);

    Ok(Json(ApiResponse::data(user).with_message("User updated")))
}

/// DELETE /user/delete/{id}
async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    ApiPath(id): ApiPath<i64>,
) -> Result<(CookieJar, Json<ApiResponse<Deleted>>), ApiError> {
    own_profile(&user, id)?;

    if !state.db.delete_user(id).await? {
        return Err(ApiError::NotFound(format!("User: {}", id)));
    }

    info!("Deleted user {}", id);

    Ok((
        jar.add(removal_cookie(PrincipalKind::User)),
        Json(ApiResponse::data(Deleted { id }).with_message("User deleted")),
    ))
}

// ==================== Follow Routes ====================

/// POST /user/follow/{id}
async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ApiResponse<UserFollow>>), ApiError> {
    if user.id == id {
        return Err(ApiError::Validation("You cannot follow yourself".to_string()));
    }

    let follow = state.db.follow_user(user.id, id).await?;
    info!("User {} followed {}", user.id, id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(follow).with_message("User followed")),
    ))
}

/// DELETE /user/follow/{id}
async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.unfollow_user(user.id, id).await? {
        return Err(ApiError::NotFound(format!("Follow of user {}", id)));
    }

    info!("User {} unfollowed {}", user.id, id);

    Ok(Json(ApiResponse::data(Deleted { id }).with_message("User unfollowed")))
}

async fn existing_user(state: &AppState, id: i64) -> Result<User, ApiError> {
    state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))
}

/// GET /user/{id}/followers
async fn followers(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    existing_user(&state, id).await?;
    Ok(Json(ApiResponse::data(state.db.list_followers(id).await?)))
}

/// GET /user/{id}/following
async fn following(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    existing_user(&state, id).await?;
    Ok(Json(ApiResponse::data(state.db.list_following(id).await?)))
}

/// Create user routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/user/get/{id}", get(get_user))
        .route("/user/{id}/followers", get(followers))
        .route("/user/{id}/following", get(following));

    let protected = user_only(
        state,
        Router::new()
            .route("/user/update/{id}", put(update_user))
            .route("/user/delete/{id}", delete(delete_user))
            .route("/user/follow/{id}", post(follow).delete(unfollow)),
    );

    public.merge(protected)
}

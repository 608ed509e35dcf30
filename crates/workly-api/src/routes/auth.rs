//! User session routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use workly_auth::{
    AuthError, CurrentUser, PrincipalKind, hash_password, removal_cookie, session_cookie,
    verify_password,
};
use workly_db::{NewUser, User};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, LoginRequest, SignupRequest};
use super::user_only;

// ==================== Login Helpers ====================

/// Argon2 hash of a throwaway password, verified against when the email is
/// unknown so that both failure paths cost the same.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| hash_password("workly-timing-guard").unwrap_or_default())
}

/// Verify `password` against the stored hash, or against a dummy hash when
/// there is no account. Only `Ok(true)` lets the login through.
pub(super) fn check_password(password: &str, stored_hash: Option<&str>) -> Result<bool, ApiError> {
    if password.len() > validation::MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            validation::MAX_PASSWORD_LENGTH
        )));
    }

    let valid = verify_password(password, stored_hash.unwrap_or_else(|| dummy_hash()))?;
    Ok(valid && stored_hash.is_some())
}

/// Record a login attempt outcome
pub(super) fn record_login(kind: PrincipalKind, success: bool) {
    if success {
        metrics::counter!("workly_logins_total", "kind" => kind.as_str()).increment(1);
    } else {
        metrics::counter!("workly_login_failures_total", "kind" => kind.as_str()).increment(1);
    }
}

// ==================== Auth Routes ====================

/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let name = validation::name("name", &request.name)?;
    let email = validation::email(&request.email)?;
    validation::password(&request.password)?;

    debug!("Registering user: {}", email);

    let password_hash = hash_password(&request.password)?;
    let user = state
        .db
        .insert_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(user).with_message("User created")),
    ))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<User>>), ApiError> {
    let email = validation::email(&request.email)?;
    debug!("Login attempt for user: {}", email);

    // Don't return early on unknown email
    let credentials = state.db.get_user_credentials(&email).await?;
    let valid = check_password(
        &request.password,
        credentials.as_ref().map(|c| c.password_hash.as_str()),
    )?;

    let user = match (credentials, valid) {
        (Some(c), true) => c.user,
        _ => {
            record_login(PrincipalKind::User, false);
            warn!("Failed login for user: {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.user_guard.codec().issue(user.id)?;
    let jar = jar.add(session_cookie(PrincipalKind::User, token, state.secure_cookies));
    record_login(PrincipalKind::User, true);

    info!("User {} logged in", user.id);

    Ok((jar, Json(ApiResponse::data(user).with_message("Login successful"))))
}

/// GET /auth/logout
async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    (
        jar.add(removal_cookie(PrincipalKind::User)),
        Json(ApiResponse::data(()).with_message("Logged out")),
    )
}

/// GET /auth/get-user
async fn current_user(CurrentUser(user): CurrentUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::data(user))
}

/// GET /auth/getuser/{id}
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

/// Create auth routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/getuser/{id}", get(get_user));

    let protected = user_only(state, Router::new().route("/auth/get-user", get(current_user)));

    public.merge(protected)
}

//! Company session and profile routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};
use workly_auth::{
    AuthError, CurrentCompany, PrincipalKind, hash_password, removal_cookie, session_cookie,
};
use workly_db::{Company, Job, NewCompany, UpdateCompany};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::auth::{check_password, record_login};
use super::company_only;
use super::types::{
    ApiResponse, CreateCompanyRequest, Deleted, LoginRequest, UpdateCompanyRequest,
};

fn own_company(company: &Company, id: i64) -> Result<(), ApiError> {
    if company.id != id {
        return Err(ApiError::NotFound(format!("Company: {}", id)));
    }
    Ok(())
}

/// Blank optional profile fields are stored as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ==================== Session Routes ====================

/// POST /company/create
async fn create_company(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Company>>), ApiError> {
    let name = validation::name("name", &request.name)?;
    let email = validation::email(&request.email)?;
    validation::password(&request.password)?;

    debug!("Registering company: {}", email);

    let password_hash = hash_password(&request.password)?;
    let company = state
        .db
        .insert_company(NewCompany {
            name,
            email,
            password_hash,
            logo: non_blank(request.logo),
            address: non_blank(request.address),
        })
        .await?;

    info!("Registered company {} ({})", company.id, company.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(company).with_message("Company created")),
    ))
}

/// POST /company/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<Company>>), ApiError> {
    let email = validation::email(&request.email)?;
    debug!("Login attempt for company: {}", email);

    let credentials = state.db.get_company_credentials(&email).await?;
    let valid = check_password(
        &request.password,
        credentials.as_ref().map(|c| c.password_hash.as_str()),
    )?;

    let company = match (credentials, valid) {
        (Some(c), true) => c.company,
        _ => {
            record_login(PrincipalKind::Company, false);
            warn!("Failed login for company: {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.company_guard.codec().issue(company.id)?;
    let jar = jar.add(session_cookie(
        PrincipalKind::Company,
        token,
        state.secure_cookies,
    ));
    record_login(PrincipalKind::Company, true);

    info!("Company {} logged in", company.id);

    Ok((
        jar,
        Json(ApiResponse::data(company).with_message("Login successful")),
    ))
}

/// GET /company/logout
async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    (
        jar.add(removal_cookie(PrincipalKind::Company)),
        Json(ApiResponse::data(()).with_message("Logged out")),
    )
}

// ==================== Profile Routes ====================

/// GET /company
async fn current_company(CurrentCompany(company): CurrentCompany) -> Json<ApiResponse<Company>> {
    Json(ApiResponse::data(company))
}

/// GET /company/get/{id}
async fn get_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    let company = state
        .db
        .get_company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Company: {}", id)))?;

    Ok(Json(ApiResponse::data(company)))
}

/// GET /company/get-all-companies
async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Company>>>, ApiError> {
    Ok(Json(ApiResponse::data(state.db.list_companies().await?)))
}

/// PUT /company/update/{id}
async fn update_company(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateCompanyRequest>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    own_company(&company, id)?;
    debug!("Updating company: {}", id);

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

    let company = state
        .db
        .update_company(
            id,
            UpdateCompany {
                name,
                email,
                password_hash,
                logo: non_blank(request.logo),
                address: non_blank(request.address),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Company: {}", id)))?;

    info!("Updated company {}", company.id);

    Ok(Json(ApiResponse::data(company).with_message("Company updated")))
}

/// DELETE /company/delete/{id}
///
/// Deletes the signed-in company's own row; its jobs stay listed without an owner.
async fn delete_company(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    jar: CookieJar,
    ApiPath(id): ApiPath<i64>,
) -> Result<(CookieJar, Json<ApiResponse<Deleted>>), ApiError> {
    own_company(&company, id)?;

    if !state.db.delete_company(company.id).await? {
        return Err(ApiError::NotFound(format!("Company: {}", id)));
    }

    info!("Deleted company {}", company.id);

    Ok((
        jar.add(removal_cookie(PrincipalKind::Company)),
        Json(ApiResponse::data(Deleted { id: company.id }).with_message("Company deleted")),
    ))
}

/// GET /company/jobs
async fn company_jobs(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
) -> Result<Json<ApiResponse<Vec<Job>>>, ApiError> {
    Ok(Json(ApiResponse::data(
        state.db.list_company_jobs(company.id).await?,
    )))
}

/// Create company routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/company/create", post(create_company))
        .route("/company/login", post(login))
        .route("/company/logout", get(logout))
        .route("/company/get/{id}", get(get_company))
        .route("/company/get-all-companies", get(list_companies));

    let protected = company_only(
        state,
        Router::new()
            .route("/company", get(current_company))
            .route("/company/update/{id}", put(update_company))
            .route("/company/delete/{id}", delete(delete_company))
            .route("/company/jobs", get(company_jobs)),
    );

    public.merge(protected)
}

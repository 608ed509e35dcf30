//! Job application routes
//!
//! Applicants reach their own applications under `/application`; companies
//! reach applications to the jobs they own under `/application/company`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use tracing::info;
use workly_auth::{CurrentCompany, CurrentUser};
use workly_db::{Application, ApplicationStatus};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

use super::types::{ApiResponse, ApplyRequest, Deleted, UpdateStatusRequest};
use super::{company_only, user_only};

// ==================== Applicant Routes ====================

/// POST /application/apply
async fn apply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<ApplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Application>>), ApiError> {
    let job_id = validation::id("job_id", request.job_id)?;

    if state.db.get_job(job_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Job: {}", job_id)));
    }

    let application = state.db.insert_application(user.id, job_id).await?;
    info!("User {} applied to job {}", user.id, job_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(application).with_message("Application submitted")),
    ))
}

/// GET /application/user
async fn my_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<Application>>>, ApiError> {
    Ok(Json(ApiResponse::data(
        state.db.list_user_applications(user.id).await?,
    )))
}

/// GET /application/{id}
async fn get_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let application = state
        .db
        .get_user_application(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Application: {}", id)))?;

    Ok(Json(ApiResponse::data(application)))
}

/// DELETE /application/{id}
async fn withdraw(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_user_application(id, user.id).await? {
        return Err(ApiError::NotFound(format!("Application: {}", id)));
    }

    info!("User {} withdrew application {}", user.id, id);

    Ok(Json(
        ApiResponse::data(Deleted { id }).with_message("Application withdrawn"),
    ))
}

// ==================== Company Routes ====================

/// GET /application/company
async fn company_applications(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
) -> Result<Json<ApiResponse<Vec<Application>>>, ApiError> {
    Ok(Json(ApiResponse::data(
        state.db.list_company_applications(company.id).await?,
    )))
}

/// GET /application/company/{id}, where `id` is one of the company's jobs
async fn job_applications(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(job_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<Application>>>, ApiError> {
    if state.db.get_company_job(job_id, company.id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Job: {}", job_id)));
    }

    Ok(Json(ApiResponse::data(
        state.db.list_job_applications(job_id).await?,
    )))
}

/// PATCH /application/company/{id}/status
async fn update_status(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let status: ApplicationStatus = request
        .status
        .parse()
        .map_err(|e: workly_db::ParseError| ApiError::Validation(e.to_string()))?;

    let application = state
        .db
        .update_application_status(id, company.id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Application: {}", id)))?;

    info!(
        "Company {} set application {} to {}",
        company.id,
        id,
        status.as_str()
    );

    Ok(Json(
        ApiResponse::data(application).with_message("Application status updated"),
    ))
}

/// DELETE /application/company/{id}
async fn delete_for_company(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_company_application(id, company.id).await? {
        return Err(ApiError::NotFound(format!("Application: {}", id)));
    }

    info!("Company {} deleted application {}", company.id, id);

    Ok(Json(
        ApiResponse::data(Deleted { id }).with_message("Application deleted"),
    ))
}

/// Create application routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let applicant = user_only(
        state,
        Router::new()
            .route("/application/apply", post(apply))
            .route("/application/user", get(my_applications))
            .route("/application/{id}", get(get_application).delete(withdraw)),
    );

    let company = company_only(
        state,
        Router::new()
            .route("/application/company", get(company_applications))
            .route(
                "/application/company/{id}",
                get(job_applications).delete(delete_for_company),
            )
            .route("/application/company/{id}/status", patch(update_status)),
    );

    applicant.merge(company)
}

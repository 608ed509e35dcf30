//! Job board routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::{debug, info};
use workly_auth::CurrentCompany;
use workly_db::{Job, JobPage, JobQuery, NewJob, UpdateJob};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::validation;

use super::company_only;
use super::types::{
    ApiResponse, CreateJobRequest, Deleted, JobListParams, LocationParams, SkillParams,
    UpdateJobRequest,
};

/// Treat a blank query parameter as absent
fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<JobListParams> for JobQuery {
    fn from(params: JobListParams) -> Self {
        JobQuery {
            company_id: params.company_id,
            location: filter_value(params.location),
            skill: filter_value(params.skill),
            text: filter_value(params.q),
            page: params.page.unwrap_or(1).max(1),
        }
    }
}

// ==================== Public Routes ====================

/// GET /job
async fn list_jobs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<JobListParams>,
) -> Result<Json<ApiResponse<JobPage>>, ApiError> {
    debug!("Listing jobs: {:?}", params);
    let page = state.db.list_jobs(params.into()).await?;
    Ok(Json(ApiResponse::data(page)))
}

/// GET /job/get/{id}
async fn get_job(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let job = state
        .db
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job: {}", id)))?;

    Ok(Json(ApiResponse::data(job)))
}

/// GET /job/company/{company_id}
async fn jobs_by_company(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<Job>>>, ApiError> {
    Ok(Json(ApiResponse::data(
        state.db.list_company_jobs(company_id).await?,
    )))
}

/// GET /job/location?location=
///
/// Unlike the general listing, no match is a 404.
async fn jobs_by_location(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocationParams>,
) -> Result<Json<ApiResponse<Vec<Job>>>, ApiError> {
    let location = filter_value(params.location)
        .ok_or_else(|| ApiError::Validation("location is required".to_string()))?;

    let jobs = state.db.list_jobs_by_location(&location).await?;
    if jobs.is_empty() {
        return Err(ApiError::NotFound(format!("Jobs in {}", location)));
    }

    Ok(Json(ApiResponse::data(jobs)))
}

/// GET /job/skill?skill=
///
/// Unlike the general listing, no match is a 404.
async fn jobs_by_skill(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SkillParams>,
) -> Result<Json<ApiResponse<Vec<Job>>>, ApiError> {
    let skill = filter_value(params.skill)
        .ok_or_else(|| ApiError::Validation("skill is required".to_string()))?;

    let jobs = state.db.list_jobs_by_skill(&skill).await?;
    if jobs.is_empty() {
        return Err(ApiError::NotFound(format!("Jobs requiring {}", skill)));
    }

    Ok(Json(ApiResponse::data(jobs)))
}

// ==================== Company Routes ====================

/// POST /job/create
async fn create_job(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiJson(request): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>), ApiError> {
    let job = NewJob {
        company_id: company.id,
        title: validation::name("title", &request.title)?,
        description: validation::required("description", &request.description)?,
        location: validation::required("location", &request.location)?,
        salary: validation::required("salary", &request.salary)?,
        skills: validation::skills(&request.skills)?,
    };

    let job = state.db.insert_job(job).await?;
    info!("Company {} posted job {}", company.id, job.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(job).with_message("Job created")),
    ))
}

/// PUT /job/update/{id}
async fn update_job(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateJobRequest>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let update = UpdateJob {
        title: request
            .title
            .as_deref()
            .map(|t| validation::name("title", t))
            .transpose()?,
        description: validation::optional("description", request.description.as_deref())?,
        location: validation::optional("location", request.location.as_deref())?,
        salary: validation::optional("salary", request.salary.as_deref())?,
        skills: request
            .skills
            .as_deref()
            .map(validation::skills)
            .transpose()?,
    };

    let job = state
        .db
        .update_job(id, company.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job: {}", id)))?;

    info!("Company {} updated job {}", company.id, job.id);

    Ok(Json(ApiResponse::data(job).with_message("Job updated")))
}

/// DELETE /job/delete/{id}
async fn delete_job(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !state.db.delete_job(id, company.id).await? {
        return Err(ApiError::NotFound(format!("Job: {}", id)));
    }

    info!("Company {} deleted job {}", company.id, id);

    Ok(Json(ApiResponse::data(Deleted { id }).with_message("Job deleted")))
}

/// Create job routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/job", get(list_jobs))
        .route("/job/get/{id}", get(get_job))
        .route("/job/company/{company_id}", get(jobs_by_company))
        .route("/job/location", get(jobs_by_location))
        .route("/job/skill", get(jobs_by_skill));

    let protected = company_only(
        state,
        Router::new()
            .route("/job/create", post(create_job))
            .route("/job/update/{id}", put(update_job))
            .route("/job/delete/{id}", delete(delete_job)),
    );

    public.merge(protected)
}

//! Request/Response DTOs

use serde::{Deserialize, Serialize};

// ==================== Envelope ====================

/// Success body: the payload under `data`, optionally with a message
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Payload of a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
}

// ==================== Auth Types ====================

/// Login request, shared by users and companies
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ==================== User Types ====================

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Update user request
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// ==================== Company Types ====================

/// Company registration request
#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Update company request
#[derive(Deserialize, Default)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
}

// ==================== Job Types ====================

/// Create job request. The owning company comes from the session.
#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Update job request; `skills` replaces the whole set when present
#[derive(Deserialize, Default)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Query parameters for the job listing
#[derive(Debug, Deserialize, Default)]
pub struct JobListParams {
    pub page: Option<i64>,
    pub company_id: Option<i64>,
    pub location: Option<String>,
    pub skill: Option<String>,
    /// Free text over title and description
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SkillParams {
    pub skill: Option<String>,
}

// ==================== Post Types ====================

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub content: String,
}

/// Body of `POST /like` and `DELETE /like`
#[derive(Deserialize)]
pub struct LikeRequest {
    pub post_id: i64,
}

// ==================== Application Types ====================

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub job_id: i64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

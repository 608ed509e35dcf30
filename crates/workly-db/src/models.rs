//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidApplicationStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidApplicationStatus(s) => {
                write!(f, "Invalid application status: {}", s)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Fixed page size for the paginated job listing
pub const JOB_PAGE_SIZE: i64 = 10;

// ==================== Principals ====================

/// User model (the password hash never lives here)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with the stored password hash, for the login path only
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Update user (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Company model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A company together with the stored password hash, for the login path only
#[derive(Debug, Clone)]
pub struct CompanyCredentials {
    pub company: Company,
    pub password_hash: String,
}

/// New company (for insertion)
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub logo: Option<String>,
    pub address: Option<String>,
}

/// Update company (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
}

// ==================== Jobs ====================

/// Skill, shared between jobs and deduplicated by name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

/// Job posting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    /// `None` once the owning company has been deleted
    pub company_id: Option<i64>,
    /// Skill names, sorted
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New job (for insertion)
#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub skills: Vec<String>,
}

/// Update job (for partial updates). `skills` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Query parameters for the job listing. Every filter is optional and they
/// combine with AND.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub company_id: Option<i64>,
    pub location: Option<String>,
    pub skill: Option<String>,
    /// Free text matched against title and description
    pub text: Option<String>,
    /// 1-based page number
    pub page: i64,
}

impl JobQuery {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(JOB_PAGE_SIZE)
    }
}

/// One page of the job listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

// ==================== Applications ====================

/// Application status, set by the company owning the job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewing => "Reviewing",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(ParseError::InvalidApplicationStatus(s.to_string())),
        }
    }
}

/// Job application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== Social ====================

/// Post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New post (for insertion)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

/// Update post (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Comment on a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Like on a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Directed follow edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserFollow {
    pub id: i64,
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for UserCredentials {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(UserCredentials {
            user: User::try_from(row)?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Company {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            logo: row.try_get("logo")?,
            address: row.try_get("address")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for CompanyCredentials {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(CompanyCredentials {
            company: Company::try_from(row)?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

/// Jobs come back without skills; the repository fills them in.
impl TryFrom<&sqlx::sqlite::SqliteRow> for Job {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            salary: row.try_get("salary")?,
            company_id: row.try_get("company_id")?,
            skills: Vec::new(),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Application {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        Ok(Application {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            job_id: row.try_get("job_id")?,
            status: ApplicationStatus::from_str(&status_str).unwrap_or_default(),
            applied_at: parse_datetime_or_now(&row.try_get::<String, _>("applied_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Post {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Comment {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            post_id: row.try_get("post_id")?,
            content: row.try_get("content")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Like {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Like {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            post_id: row.try_get("post_id")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for UserFollow {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(UserFollow {
            id: row.try_get("id")?,
            follower_id: row.try_get("follower_id")?,
            followed_id: row.try_get("followed_id")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

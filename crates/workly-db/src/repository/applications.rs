//! Job application operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Application, ApplicationStatus};
use crate::repository::Database;

const APPLICATION_COLUMNS: &str = "a.id, a.user_id, a.job_id, a.status, a.applied_at, a.updated_at";

impl Database {
    // ==================== Applicant Side ====================

    /// Apply `user_id` to `job_id`. Applying twice to the same job is a duplicate.
    pub async fn insert_application(&self, user_id: i64, job_id: i64) -> Result<Application, DbError> {
        let now = Utc::now();
        let status = ApplicationStatus::default();

        let result = sqlx::query(
            r#"
            INSERT INTO applications (user_id, job_id, status, applied_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate("Already applied to this job".to_string())
            }
            _ => DbError::foreign_key_violation(e, format!("Job: {}", job_id)),
        })?;

        Ok(Application {
            id: result.get("id"),
            user_id,
            job_id,
            status,
            applied_at: now,
            updated_at: now,
        })
    }

    /// Applications submitted by a user
    pub async fn list_user_applications(&self, user_id: i64) -> Result<Vec<Application>, DbError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.user_id = ? ORDER BY a.id DESC"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Application::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// One of a user's own applications
    pub async fn get_user_application(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Application>, DbError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ? AND a.user_id = ?"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Application::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Withdraw one of a user's own applications
    pub async fn delete_user_application(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Company Side ====================

    /// Applications to any job owned by a company
    pub async fn list_company_applications(
        &self,
        company_id: i64,
    ) -> Result<Vec<Application>, DbError> {
        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE j.company_id = ?
            ORDER BY a.id DESC
            "#
        );
        let rows = sqlx::query(&sql).bind(company_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Application::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Applications to one job. Callers check job ownership first.
    pub async fn list_job_applications(&self, job_id: i64) -> Result<Vec<Application>, DbError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.job_id = ? ORDER BY a.id DESC"
        );
        let rows = sqlx::query(&sql).bind(job_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Application::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Set the status of an application to a job owned by `company_id`
    pub async fn update_application_status(
        &self,
        id: i64,
        company_id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, updated_at = ?
            WHERE id = ? AND job_id IN (SELECT id FROM jobs WHERE company_id = ?)
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| Application::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete an application to a job owned by `company_id`
    pub async fn delete_company_application(
        &self,
        id: i64,
        company_id: i64,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM applications WHERE id = ? AND job_id IN (SELECT id FROM jobs WHERE company_id = ?)",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

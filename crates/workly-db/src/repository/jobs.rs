//! Job and skill operations

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use crate::error::DbError;
use crate::models::{JOB_PAGE_SIZE, Job, JobPage, JobQuery, NewJob, Skill, UpdateJob};
use crate::repository::Database;
use crate::utils::{contains_pattern, normalize_skills};

const JOB_COLUMNS: &str =
    "id, title, description, location, salary, company_id, created_at, updated_at";

/// Bound value for a dynamically built job filter
enum Param {
    Int(i64),
    Text(String),
}

/// Build the WHERE clause for a job query
fn job_filter(query: &JobQuery) -> (String, Vec<Param>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(company_id) = query.company_id {
        conditions.push("company_id = ?");
        params.push(Param::Int(company_id));
    }
    if let Some(location) = &query.location {
        conditions.push("location = ? COLLATE NOCASE");
        params.push(Param::Text(location.clone()));
    }
    if let Some(skill) = &query.skill {
        conditions.push(
            r#"EXISTS (
                SELECT 1 FROM job_skills js
                JOIN skills s ON s.id = js.skill_id
                WHERE js.job_id = jobs.id AND s.name = ? COLLATE NOCASE
            )"#,
        );
        params.push(Param::Text(skill.clone()));
    }
    if let Some(text) = &query.text {
        let pattern = contains_pattern(text);
        conditions.push(r#"(title LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\')"#);
        params.push(Param::Text(pattern.clone()));
        params.push(Param::Text(pattern));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

/// Insert missing skills and link them to a job
async fn attach_skills(
    conn: &mut SqliteConnection,
    job_id: i64,
    skills: &[String],
) -> Result<(), DbError> {
    let now = Utc::now().to_rfc3339();
    for name in skills {
        sqlx::query("INSERT INTO skills (name, created_at) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .bind(&now)
            .execute(&mut *conn)
            .await?;

        let skill_id: i64 = sqlx::query("SELECT id FROM skills WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?
            .get("id");

        sqlx::query("INSERT OR IGNORE INTO job_skills (job_id, skill_id) VALUES (?, ?)")
            .bind(job_id)
            .bind(skill_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

impl Database {
    // ==================== Job Operations ====================

    /// Insert a job and link its skills, creating skills on first use
    pub async fn insert_job(&self, job: NewJob) -> Result<Job, DbError> {
        let now = Utc::now();
        let skills = normalize_skills(&job.skills);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, description, location, salary, company_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(job.company_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::foreign_key_violation(e, format!("Company: {}", job.company_id)))?;

        let id: i64 = result.get("id");
        attach_skills(&mut *tx, id, &skills).await?;
        tx.commit().await?;

        let mut skills = skills;
        skills.sort();

        Ok(Job {
            id,
            title: job.title,
            description: job.description,
            location: job.location,
            salary: job.salary,
            company_id: Some(job.company_id),
            skills,
            created_at: now,
            updated_at: now,
        })
    }

    /// Skill names of a job, sorted
    pub async fn get_job_skills(&self, job_id: i64) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT s.name
            FROM skills s
            JOIN job_skills js ON js.skill_id = s.id
            WHERE js.job_id = ?
            ORDER BY s.name
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// All known skills
    pub async fn list_skills(&self) -> Result<Vec<Skill>, DbError> {
        let rows = sqlx::query("SELECT id, name FROM skills ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Skill {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Map job rows and fill in their skills
    async fn hydrate_jobs(&self, rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Job>, DbError> {
        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let mut job = Job::try_from(row)?;
            job.skills = self.get_job_skills(job.id).await?;
            jobs.push(job);
        }
        Ok(jobs)
    }

    /// Get a job by ID
    pub async fn get_job(&self, id: i64) -> Result<Option<Job>, DbError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Ok(self.hydrate_jobs(&[row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Get a job only if it belongs to the given company
    pub async fn get_company_job(&self, id: i64, company_id: i64) -> Result<Option<Job>, DbError> {
        Ok(self
            .get_job(id)
            .await?
            .filter(|job| job.company_id == Some(company_id)))
    }

    /// Filtered, paginated job listing
    pub async fn list_jobs(&self, query: JobQuery) -> Result<JobPage, DbError> {
        let (where_clause, params) = job_filter(&query);

        // Get total count
        let count_sql = format!("SELECT COUNT(*) as count FROM jobs {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = match param {
                Param::Int(v) => count_query.bind(*v),
                Param::Text(v) => count_query.bind(v.as_str()),
            };
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("count");

        // Get jobs
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs {} ORDER BY id DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = match param {
                Param::Int(v) => rows_query.bind(*v),
                Param::Text(v) => rows_query.bind(v.as_str()),
            };
        }
        let rows = rows_query
            .bind(JOB_PAGE_SIZE)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(JobPage {
            jobs: self.hydrate_jobs(&rows).await?,
            page: query.page.max(1),
            page_size: JOB_PAGE_SIZE,
            total,
        })
    }

    /// Every job matching a filter, unpaginated
    async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, DbError> {
        let (where_clause, params) = job_filter(query);
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs {} ORDER BY id DESC", where_clause);
        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = match param {
                Param::Int(v) => rows_query.bind(*v),
                Param::Text(v) => rows_query.bind(v.as_str()),
            };
        }
        let rows = rows_query.fetch_all(&self.pool).await?;
        self.hydrate_jobs(&rows).await
    }

    /// Jobs posted by a company
    pub async fn list_company_jobs(&self, company_id: i64) -> Result<Vec<Job>, DbError> {
        self.find_jobs(&JobQuery {
            company_id: Some(company_id),
            ..Default::default()
        })
        .await
    }

    /// Jobs at a location (case-insensitive exact match)
    pub async fn list_jobs_by_location(&self, location: &str) -> Result<Vec<Job>, DbError> {
        self.find_jobs(&JobQuery {
            location: Some(location.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Jobs requiring a skill (case-insensitive exact match)
    pub async fn list_jobs_by_skill(&self, skill: &str) -> Result<Vec<Job>, DbError> {
        self.find_jobs(&JobQuery {
            skill: Some(skill.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Update a job owned by `company_id`. Returns `None` when no such owned job exists.
    pub async fn update_job(
        &self,
        id: i64,
        company_id: i64,
        update: UpdateJob,
    ) -> Result<Option<Job>, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                location = COALESCE(?, location),
                salary = COALESCE(?, salary),
                updated_at = ?
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.location)
        .bind(&update.salary)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(company_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(skills) = update.skills {
            sqlx::query("DELETE FROM job_skills WHERE job_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            attach_skills(&mut *tx, id, &normalize_skills(&skills)).await?;
        }

        tx.commit().await?;
        self.get_job(id).await
    }

    /// Delete a job owned by `company_id`, cascading to its applications
    pub async fn delete_job(&self, id: i64, company_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Company operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Company, CompanyCredentials, NewCompany, UpdateCompany};
use crate::repository::Database;

const COMPANY_COLUMNS: &str = "id, name, email, logo, address, created_at, updated_at";

impl Database {
    /// Insert a new company
    pub async fn insert_company(&self, company: NewCompany) -> Result<Company, DbError> {
        let now = Utc::now();

        if self.get_company_credentials(&company.email).await?.is_some() {
            return Err(DbError::Duplicate(format!(
                "Company '{}' already exists",
                company.email
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO companies (name, email, password_hash, logo, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.password_hash)
        .bind(&company.logo)
        .bind(&company.address)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::unique_violation(e, format!("Company '{}' already exists", company.email))
        })?;

        let id: i64 = result.get("id");

        Ok(Company {
            id,
            name: company.name,
            email: company.email,
            logo: company.logo,
            address: company.address,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a company and the stored password hash by email
    pub async fn get_company_credentials(
        &self,
        email: &str,
    ) -> Result<Option<CompanyCredentials>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, logo, address, created_at, updated_at
            FROM companies
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| CompanyCredentials::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a company by ID
    pub async fn get_company_by_id(&self, id: i64) -> Result<Option<Company>, DbError> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result.map(|row| Company::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all companies
    pub async fn list_companies(&self) -> Result<Vec<Company>, DbError> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Company::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update a company. Only fields that are `Some` change.
    pub async fn update_company(
        &self,
        id: i64,
        update: UpdateCompany,
    ) -> Result<Option<Company>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                logo = COALESCE(?, logo),
                address = COALESCE(?, address),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(&update.logo)
        .bind(&update.address)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::unique_violation(e, "Email already registered"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_company_by_id(id).await
    }

    /// Delete a company. Its jobs survive with a NULL company.
    pub async fn delete_company(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{NewJob, UpdateCompany};
    use crate::repository::test_support::{create_company, test_db};

    #[tokio::test]
    async fn test_company_lifecycle() {
        let (db, _dir) = test_db().await;
        let company = create_company(&db, "hr@acme.io").await;

        let creds = db.get_company_credentials("hr@acme.io").await.unwrap().unwrap();
        assert_eq!(creds.company, company);

        let updated = db
            .update_company(
                company.id,
                UpdateCompany {
                    logo: Some("https://acme.io/logo.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.logo.as_deref(), Some("https://acme.io/logo.png"));
        assert_eq!(updated.address.as_deref(), Some("Berlin"));

        assert_eq!(db.list_companies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_company_keeps_jobs() {
        let (db, _dir) = test_db().await;
        let company = create_company(&db, "hr@acme.io").await;
        let job = db
            .insert_job(NewJob {
                company_id: company.id,
                title: "Engineer".to_string(),
                description: "Build things".to_string(),
                location: "Remote".to_string(),
                salary: "100k".to_string(),
                skills: vec!["rust".to_string()],
            })
            .await
            .unwrap();

        assert!(db.delete_company(company.id).await.unwrap());
        assert!(db.get_company_by_id(company.id).await.unwrap().is_none());

        let orphan = db.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(orphan.company_id, None);
        assert_eq!(orphan.skills, vec!["rust".to_string()]);
    }
}

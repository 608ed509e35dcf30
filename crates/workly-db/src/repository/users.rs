//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, UpdateUser, User, UserCredentials};
use crate::repository::Database;

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        if self.get_user_credentials(&user.email).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::unique_violation(e, format!("User '{}' already exists", user.email)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user and the stored password hash by email
    pub async fn get_user_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| UserCredentials::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update a user. Only fields that are `Some` change; all of them change in one statement.
    pub async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::unique_violation(e, "Email already registered"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_by_id(id).await
    }

    /// Delete a user, cascading to posts, comments, likes, follows and applications
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{NewPost, NewUser, UpdateUser};
    use crate::repository::test_support::{create_user, test_db};
    use crate::DbError;

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "a@x.com").await;

        let found = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found, user);

        let creds = db.get_user_credentials("a@x.com").await.unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash");

        assert!(db.get_user_by_id(0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (db, _dir) = test_db().await;
        create_user(&db, "a@x.com").await;

        let err = db
            .insert_user(NewUser {
                name: "again".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "a@x.com").await;
        create_user(&db, "b@x.com").await;

        let updated = db
            .update_user(
                user.id,
                UpdateUser {
                    name: Some("Alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.email, "a@x.com");

        let err = db
            .update_user(
                user.id,
                UpdateUser {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));

        assert!(db.update_user(9999, UpdateUser::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_posts() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "a@x.com").await;
        let post = db
            .insert_post(NewPost {
                user_id: user.id,
                title: "hello".to_string(),
                content: "world".to_string(),
            })
            .await
            .unwrap();

        assert!(db.delete_user(user.id).await.unwrap());
        assert!(db.get_post(post.id).await.unwrap().is_none());
        assert!(!db.delete_user(user.id).await.unwrap());
    }
}

//! Follow graph between users

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{User, UserFollow};
use crate::repository::Database;

impl Database {
    /// Record that `follower_id` follows `followed_id`
    pub async fn follow_user(
        &self,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<UserFollow, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO user_follows (follower_id, followed_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate("Already following this user".to_string())
            }
            _ => DbError::foreign_key_violation(e, format!("User: {}", followed_id)),
        })?;

        Ok(UserFollow {
            id: result.get("id"),
            follower_id,
            followed_id,
            created_at: now,
        })
    }

    /// Remove a follow edge
    pub async fn unfollow_user(&self, follower_id: i64, followed_id: i64) -> Result<bool, DbError> {
        let result =
            sqlx::query("DELETE FROM user_follows WHERE follower_id = ? AND followed_id = ?")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users following `user_id`
    pub async fn list_followers(&self, user_id: i64) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.created_at, u.updated_at
            FROM users u
            JOIN user_follows f ON f.follower_id = u.id
            WHERE f.followed_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Users that `user_id` follows
    pub async fn list_following(&self, user_id: i64) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.created_at, u.updated_at
            FROM users u
            JOIN user_follows f ON f.followed_id = u.id
            WHERE f.follower_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }
}

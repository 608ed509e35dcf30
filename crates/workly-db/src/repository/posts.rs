//! Post, comment and like operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Comment, Like, NewPost, Post, UpdatePost};
use crate::repository::Database;

const POST_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (user_id, title, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::foreign_key_violation(e, format!("User: {}", post.user_id)))?;

        Ok(Post {
            id: result.get("id"),
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a post by ID
    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, DbError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>, DbError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List posts written by a user, newest first
    pub async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, DbError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY id DESC");
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update a post written by `user_id`
    pub async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        update: UpdatePost,
    ) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    /// Delete a post written by `user_id`, along with its comments and likes
    pub async fn delete_post(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Comment Operations ====================

    /// Comment on a post
    pub async fn insert_comment(
        &self,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (user_id, post_id, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(content)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::foreign_key_violation(e, format!("Post: {}", post_id)))?;

        Ok(Comment {
            id: result.get("id"),
            user_id,
            post_id,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Comments on a post in the order they were written
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, post_id, content, created_at
            FROM comments
            WHERE post_id = ?
            ORDER BY id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Comment::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete a comment written by `user_id`
    pub async fn delete_comment(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Like Operations ====================

    /// Like a post. A second like by the same user is a duplicate.
    pub async fn insert_like(&self, user_id: i64, post_id: i64) -> Result<Like, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO likes (user_id, post_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate("Post already liked".to_string())
            }
            _ => DbError::foreign_key_violation(e, format!("Post: {}", post_id)),
        })?;

        Ok(Like {
            id: result.get("id"),
            user_id,
            post_id,
            created_at: now,
        })
    }

    /// Remove a like
    pub async fn delete_like(&self, user_id: i64, post_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Likes on a post
    pub async fn list_likes(&self, post_id: i64) -> Result<Vec<Like>, DbError> {
        let rows = sqlx::query(
            "SELECT id, user_id, post_id, created_at FROM likes WHERE post_id = ? ORDER BY id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Like::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::DbError;
    use crate::models::{NewPost, UpdatePost};
    use crate::repository::test_support::{create_user, test_db};

    fn new_post(user_id: i64, title: &str) -> NewPost {
        NewPost {
            user_id,
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_post_edit_is_author_only() {
        let (db, _dir) = test_db().await;
        let author = create_user(&db, "a@x.com").await;
        let other = create_user(&db, "b@x.com").await;
        let post = db.insert_post(new_post(author.id, "first")).await.unwrap();

        let update = UpdatePost {
            title: Some("edited".to_string()),
            content: None,
        };
        assert!(db.update_post(post.id, other.id, update.clone()).await.unwrap().is_none());
        assert!(!db.delete_post(post.id, other.id).await.unwrap());

        let edited = db.update_post(post.id, author.id, update).await.unwrap().unwrap();
        assert_eq!(edited.title, "edited");
        assert_eq!(edited.content, "body");

        assert_eq!(db.list_user_posts(author.id).await.unwrap().len(), 1);
        assert!(db.list_user_posts(other.id).await.unwrap().is_empty());
        assert!(db.delete_post(post.id, author.id).await.unwrap());
        assert!(db.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_and_likes() {
        let (db, _dir) = test_db().await;
        let author = create_user(&db, "a@x.com").await;
        let reader = create_user(&db, "b@x.com").await;
        let post = db.insert_post(new_post(author.id, "first")).await.unwrap();

        let comment = db.insert_comment(reader.id, post.id, "nice").await.unwrap();
        assert_eq!(db.list_comments(post.id).await.unwrap(), vec![comment.clone()]);
        assert!(!db.delete_comment(comment.id, author.id).await.unwrap());
        assert!(db.delete_comment(comment.id, reader.id).await.unwrap());

        db.insert_like(reader.id, post.id).await.unwrap();
        let err = db.insert_like(reader.id, post.id).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
        assert_eq!(db.list_likes(post.id).await.unwrap().len(), 1);

        assert!(db.delete_like(reader.id, post.id).await.unwrap());
        assert!(!db.delete_like(reader.id, post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "a@x.com").await;

        let err = db.insert_comment(user.id, 404, "hello?").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
        let err = db.insert_like(user.id, 404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use thiserror::Error;

use crate::models::blog::{Blog, BlogWithUser, NewBlog};
use crate::models::user::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value: {0}")]
    Duplicate(String),

    #[error("user {0} does not exist")]
    MissingUser(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for users and saved blogs.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, StoreError>;
    /// Newest first.
    async fn list_blogs(&self) -> Result<Vec<BlogWithUser>, StoreError>;
    /// Returns `false` when no blog had that id.
    async fn delete_blog(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone, Debug)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BlogUserRow {
    id: i64,
    title: String,
    content: String,
    summary: Option<String>,
    user_id: i64,
    created_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_created_at: DateTime<Utc>,
}

impl From<BlogUserRow> for BlogWithUser {
    fn from(row: BlogUserRow) -> Self {
        BlogWithUser {
            blog: Blog {
                id: row.id,
                title: row.title,
                content: row.content,
                summary: row.summary,
                user_id: row.user_id,
                created_at: row.created_at,
            },
            user: User {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                created_at: row.user_created_at,
            },
        }
    }
}

#[async_trait]
impl BlogStore for MySqlStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Duplicate(user.email.clone())
                }
                other => StoreError::Database(other),
            })?;

        let created = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = ?",
        )
        .bind(result.last_insert_id() as i64)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, StoreError> {
        let result = sqlx::query(
            "INSERT INTO blogs (title, content, summary, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.summary)
        .bind(blog.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::MissingUser(blog.user_id)
            }
            other => StoreError::Database(other),
        })?;

        let created = sqlx::query_as::<_, Blog>(
            "SELECT id, title, content, summary, user_id, created_at FROM blogs WHERE id = ?",
        )
        .bind(result.last_insert_id() as i64)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_blogs(&self) -> Result<Vec<BlogWithUser>, StoreError> {
        let rows = sqlx::query_as::<_, BlogUserRow>(
            "
            SELECT b.id, b.title, b.content, b.summary, b.user_id, b.created_at,
                   u.name AS user_name, u.email AS user_email, u.created_at AS user_created_at
            FROM blogs b
            INNER JOIN users u ON u.id = b.user_id
            ORDER BY b.created_at DESC, b.id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BlogWithUser::from).collect())
    }

    async fn delete_blog(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::default();
        store.create_user(user("Ada", "ada@example.com")).await.unwrap();
        let err = store
            .create_user(user("Other", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn blogs_list_newest_first_and_delete() {
        let store = MemoryStore::default();
        let owner = store.create_user(user("Ada", "ada@example.com")).await.unwrap();
        for title in ["first", "second"] {
            store
                .create_blog(NewBlog {
                    title: title.into(),
                    content: "body".into(),
                    summary: None,
                    user_id: owner.id,
                })
                .await
                .unwrap();
        }

        let listed = store.list_blogs().await.unwrap();
        assert_eq!(listed[0].blog.title, "second");
        assert_eq!(listed[1].user, owner);

        assert!(store.delete_blog(listed[0].blog.id).await.unwrap());
        assert!(!store.delete_blog(listed[0].blog.id).await.unwrap());
        assert_eq!(store.list_blogs().await.unwrap().len(), 1);
    }

    #[test]
    fn joined_row_splits_into_blog_and_user() {
        let now = Utc::now();
        let row = BlogUserRow {
            id: 7,
            title: "T".into(),
            content: "C".into(),
            summary: Some("S".into()),
            user_id: 3,
            created_at: now,
            user_name: "Ada".into(),
            user_email: "ada@example.com".into(),
            user_created_at: now,
        };
        let joined = BlogWithUser::from(row);
        assert_eq!(joined.blog.id, 7);
        assert_eq!(joined.user.id, 3);
        assert_eq!(joined.user.email, "ada@example.com");

        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value["userId"], 3);
        assert_eq!(value["user"]["name"], "Ada");
    }
}

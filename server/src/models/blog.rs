use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub user_id: i64,
}

/// A blog together with its owner, as listed on the saved page.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithUser {
    #[serde(flatten)]
    pub blog: Blog,
    pub user: User,
}

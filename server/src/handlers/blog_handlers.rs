use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{api_error, required, store_error, ApiError};
use crate::models::blog::{Blog, BlogWithUser, NewBlog};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub user_id: Option<i64>,
}

pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogWithUser>>, ApiError> {
    let blogs = state.store.list_blogs().await.map_err(|e| store_error(&e))?;
    Ok(Json(blogs))
}

pub async fn create_blog(
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogPayload>,
) -> Result<Json<Blog>, ApiError> {
    let missing = || {
        api_error(
            StatusCode::BAD_REQUEST,
            "title, content, and userId are required.",
        )
    };
    let title = required(payload.title.as_deref()).ok_or_else(missing)?;
    let content = required(payload.content.as_deref()).ok_or_else(missing)?;
    let user_id = payload.user_id.filter(|id| *id > 0).ok_or_else(missing)?;

    let unknown_user = || {
        api_error(
            StatusCode::BAD_REQUEST,
            "User not found. Please provide a valid userId.",
        )
    };
    if state
        .store
        .find_user(user_id)
        .await
        .map_err(|e| store_error(&e))?
        .is_none()
    {
        return Err(unknown_user());
    }

    let blog = state
        .store
        .create_blog(NewBlog {
            title: title.to_string(),
            content: content.to_string(),
            summary: required(payload.summary.as_deref()).map(str::to_string),
            user_id,
        })
        .await
        .map_err(|e| match e {
            // The user can vanish between the lookup and the insert.
            StoreError::MissingUser(_) => unknown_user(),
            other => store_error(&other),
        })?;

    info!(blog_id = blog.id, user_id, "blog saved");
    Ok(Json(blog))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid blog ID"))?;

    let deleted = state.store.delete_blog(id).await.map_err(|e| store_error(&e))?;
    if !deleted {
        return Err(api_error(StatusCode::NOT_FOUND, format!("Blog with ID {id} not found.")));
    }

    info!(blog_id = id, "blog deleted");
    Ok(Json(json!({ "message": format!("Blog with ID {id} deleted.") })))
}

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use super::{api_error, required, store_error, ApiError};
use crate::models::user::{NewUser, User};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Deserialize)]
pub struct CreateUserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list_users().await.map_err(|e| store_error(&e))?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<Json<User>, ApiError> {
    let (Some(name), Some(email)) = (
        required(payload.name.as_deref()),
        required(payload.email.as_deref()),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Name and email are required."));
    };

    let user = state
        .store
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => api_error(
                StatusCode::BAD_REQUEST,
                "User creation failed. Email may already exist.",
            ),
            other => store_error(&other),
        })?;

    info!(user_id = user.id, "user created");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::state;

    fn payload(name: &str, email: &str) -> Json<CreateUserPayload> {
        Json(CreateUserPayload {
            name: Some(name.into()),
            email: Some(email.into()),
        })
    }

    #[tokio::test]
    async fn create_and_list() {
        let app = state(None);
        let Json(user) = create_user(State(app.clone()), payload(" Ada ", "ada@example.com"))
            .await
            .unwrap();
        assert_eq!(user.name, "Ada");

        let Json(users) = list_users(State(app)).await.unwrap();
        assert_eq!(users, vec![user]);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_bad_request() {
        let app = state(None);
        create_user(State(app.clone()), payload("Ada", "ada@example.com"))
            .await
            .unwrap();

        let (status, Json(body)) = create_user(State(app), payload("Eve", "ada@example.com"))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User creation failed. Email may already exist.");
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let (status, Json(body)) = create_user(State(state(None)), payload("Ada", ""))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name and email are required.");
    }
}

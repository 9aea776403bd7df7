use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::user::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user_id: i32,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<Json<CreateUserResponse>> {
    let users = UserService::new(state.pool.clone());
    let user = users.create(&body.username, &body.email, &body.password_hash)?;
    Ok(Json(CreateUserResponse {
        message: "user created".to_string(),
        user_id: user.id,
    }))
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub disabled: bool,
    pub created: DateTime<Utc>,
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserList>>> {
    let users = UserService::new(state.pool.clone());
    let list = users
        .list()?
        .into_iter()
        .map(|user| UserList {
            id: user.id,
            username: user.username,
            email: user.email,
            disabled: user.disabled,
            created: user.created,
        })
        .collect();
    Ok(Json(list))
}

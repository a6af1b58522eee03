use axum::Json;
use axum::extract::{Path, State};
use classbook_application::UserRecord;

use crate::auth::CurrentUser;
use crate::dto::{IdentityResponse, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

fn responses(users: Vec<UserRecord>) -> Json<Vec<UserResponse>> {
    Json(users.into_iter().map(UserResponse::from).collect())
}

pub async fn me_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<IdentityResponse>> {
    let user = state.authentication_service.find_user(&identity).await?;
    Ok(Json(IdentityResponse::new(&identity, user)))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users(&identity).await?;
    Ok(responses(users))
}

pub async fn users_by_role_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(role): Path<String>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.users_with_role(&identity, &role).await?;
    Ok(responses(users))
}

pub async fn group_members_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .group_members(&identity, &group_id)
        .await?;
    Ok(responses(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.find_account(&identity, &user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

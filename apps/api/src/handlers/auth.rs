use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use classbook_application::RegisterParams;

use crate::auth::{BearerToken, CurrentUser};
use crate::dto::{GroupResponse, SignInRequest, SignInResponse, SignUpRequest, UserResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

pub async fn signin_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let signed_in = state
        .authentication_service
        .sign_in(&payload.username, &payload.password)
        .await?;

    Ok(Json(SignInResponse::from(signed_in)))
}

pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .user_service
        .register(RegisterParams {
            full_name: payload.full_name,
            email: payload.email,
            password: payload.password,
            group_id: payload.group_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn signout_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    BearerToken(token): BearerToken,
) -> ApiResult<StatusCode> {
    state.authentication_service.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_groups_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    let groups = state
        .user_service
        .list_groups()
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(groups))
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use classbook_application::{Audience, RecordQuery};
use classbook_domain::Homework;

use crate::auth::CurrentUser;
use crate::dto::{DiaryListQuery, HomeworkRequest, HomeworkResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

fn responses(records: Vec<Homework>) -> Json<Vec<HomeworkResponse>> {
    Json(records.into_iter().map(HomeworkResponse::from).collect())
}

pub async fn list_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<DiaryListQuery>,
) -> ApiResult<Json<Vec<HomeworkResponse>>> {
    let records = state
        .homework_service
        .list(
            &identity,
            Audience::GroupScoped,
            RecordQuery {
                student_id: None,
                group_id: query.group_id.as_deref(),
                subject: query.subject.as_deref(),
            },
        )
        .await?;

    Ok(responses(records))
}

pub async fn group_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<HomeworkResponse>>> {
    let records = state
        .homework_service
        .list(&identity, Audience::GroupScoped, RecordQuery::group(&group_id))
        .await?;

    Ok(responses(records))
}

pub async fn student_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<HomeworkResponse>>> {
    let records = state
        .homework_service
        .list(
            &identity,
            Audience::SelfService,
            RecordQuery::student(&student_id),
        )
        .await?;

    Ok(responses(records))
}

pub async fn get_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(homework_id): Path<String>,
) -> ApiResult<Json<HomeworkResponse>> {
    let record = state
        .homework_service
        .get(&identity, Audience::GroupScoped, &homework_id)
        .await?;

    Ok(Json(HomeworkResponse::from(record)))
}

pub async fn create_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(payload): ApiJson<HomeworkRequest>,
) -> ApiResult<(StatusCode, Json<HomeworkResponse>)> {
    let record = state
        .homework_service
        .create(&identity, Homework::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(HomeworkResponse::from(record))))
}

pub async fn update_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(homework_id): Path<String>,
    ApiJson(payload): ApiJson<HomeworkRequest>,
) -> ApiResult<Json<HomeworkResponse>> {
    let record = state
        .homework_service
        .update(&identity, &homework_id, Homework::from(payload))
        .await?;

    Ok(Json(HomeworkResponse::from(record)))
}

pub async fn delete_homework_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(homework_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .homework_service
        .delete(&identity, &homework_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

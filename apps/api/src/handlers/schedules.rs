use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Local};
use classbook_application::ScheduleDraft;
use classbook_domain::parse_day_of_week;

use crate::auth::CurrentUser;
use crate::dto::{DayScheduleQuery, ScheduleRequest, ScheduleResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

use super::require_write_access;

pub async fn list_schedules_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<ScheduleResponse>>> {
    let entries = state
        .schedule_service
        .list(&identity)
        .await?
        .into_iter()
        .map(ScheduleResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn today_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<DayScheduleQuery>,
) -> ApiResult<Json<Vec<ScheduleResponse>>> {
    let entries = state
        .schedule_service
        .list_for_day(&identity, Local::now().weekday(), query.group_id.as_deref())
        .await?
        .into_iter()
        .map(ScheduleResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn day_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(day): Path<String>,
    Query(query): Query<DayScheduleQuery>,
) -> ApiResult<Json<Vec<ScheduleResponse>>> {
    let day = parse_day_of_week(&day)?;
    let entries = state
        .schedule_service
        .list_for_day(&identity, day, query.group_id.as_deref())
        .await?
        .into_iter()
        .map(ScheduleResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn get_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(entry_id): Path<String>,
) -> ApiResult<Json<ScheduleResponse>> {
    let entry = state.schedule_service.get(&identity, &entry_id).await?;
    Ok(Json(ScheduleResponse::from(entry)))
}

pub async fn create_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(payload): ApiJson<ScheduleRequest>,
) -> ApiResult<(StatusCode, Json<ScheduleResponse>)> {
    require_write_access(&identity, &payload.subject)?;
    let entry = state
        .schedule_service
        .create(&identity, ScheduleDraft::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(entry))))
}

pub async fn update_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(entry_id): Path<String>,
    ApiJson(payload): ApiJson<ScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    require_write_access(&identity, &payload.subject)?;
    let entry = state
        .schedule_service
        .update(&identity, &entry_id, ScheduleDraft::try_from(payload)?)
        .await?;

    Ok(Json(ScheduleResponse::from(entry)))
}

pub async fn delete_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(entry_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.schedule_service.delete(&identity, &entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

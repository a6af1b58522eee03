use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use classbook_application::{Audience, RecordQuery};
use classbook_domain::AttendanceRecord;

use crate::auth::CurrentUser;
use crate::dto::{AttendanceRequest, AttendanceResponse, DiaryListQuery};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

use super::require_write_access;

fn responses(records: Vec<AttendanceRecord>) -> Json<Vec<AttendanceResponse>> {
    Json(records.into_iter().map(AttendanceResponse::from).collect())
}

pub async fn list_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<DiaryListQuery>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let records = state
        .attendance_service
        .list(
            &identity,
            Audience::SelfService,
            RecordQuery {
                student_id: query.student_id.as_deref(),
                group_id: query.group_id.as_deref(),
                subject: query.subject.as_deref(),
            },
        )
        .await?;

    Ok(responses(records))
}

pub async fn student_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let records = state
        .attendance_service
        .list(
            &identity,
            Audience::SelfService,
            RecordQuery::student(&student_id),
        )
        .await?;

    Ok(responses(records))
}

pub async fn group_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let records = state
        .attendance_service
        .list(&identity, Audience::Staff, RecordQuery::group(&group_id))
        .await?;

    Ok(responses(records))
}

pub async fn get_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(record_id): Path<String>,
) -> ApiResult<Json<AttendanceResponse>> {
    let record = state
        .attendance_service
        .get(&identity, Audience::SelfService, &record_id)
        .await?;

    Ok(Json(AttendanceResponse::from(record)))
}

pub async fn create_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(payload): ApiJson<AttendanceRequest>,
) -> ApiResult<(StatusCode, Json<AttendanceResponse>)> {
    require_write_access(&identity, &payload.subject)?;
    let record = state
        .attendance_service
        .create(&identity, AttendanceRecord::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(record))))
}

pub async fn update_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(record_id): Path<String>,
    ApiJson(payload): ApiJson<AttendanceRequest>,
) -> ApiResult<Json<AttendanceResponse>> {
    require_write_access(&identity, &payload.subject)?;
    let record = state
        .attendance_service
        .update(&identity, &record_id, AttendanceRecord::try_from(payload)?)
        .await?;

    Ok(Json(AttendanceResponse::from(record)))
}

pub async fn delete_attendance_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(record_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .attendance_service
        .delete(&identity, &record_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

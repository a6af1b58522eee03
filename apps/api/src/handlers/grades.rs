use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use classbook_application::{Audience, RecordQuery};
use classbook_domain::Grade;

use crate::auth::CurrentUser;
use crate::dto::{DiaryListQuery, GradeAverageResponse, GradeRequest, GradeResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

pub async fn list_grades_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<DiaryListQuery>,
) -> ApiResult<Json<Vec<GradeResponse>>> {
    let grades = state
        .grade_service
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

    Ok(Json(grades.into_iter().map(GradeResponse::from).collect()))
}

pub async fn student_grades_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(student_id): Path<String>,
    Query(query): Query<DiaryListQuery>,
) -> ApiResult<Json<Vec<GradeResponse>>> {
    let grades = state
        .grade_service
        .list(
            &identity,
            Audience::SelfService,
            RecordQuery {
                subject: query.subject.as_deref(),
                ..RecordQuery::student(&student_id)
            },
        )
        .await?;

    Ok(Json(grades.into_iter().map(GradeResponse::from).collect()))
}

pub async fn group_grades_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(group_id): Path<String>,
    Query(query): Query<DiaryListQuery>,
) -> ApiResult<Json<Vec<GradeResponse>>> {
    let grades = state
        .grade_service
        .list(
            &identity,
            Audience::Staff,
            RecordQuery {
                subject: query.subject.as_deref(),
                ..RecordQuery::group(&group_id)
            },
        )
        .await?;

    Ok(Json(grades.into_iter().map(GradeResponse::from).collect()))
}

pub async fn grade_average_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(student_id): Path<String>,
) -> ApiResult<Json<GradeAverageResponse>> {
    let average = state
        .grade_service
        .average_for_student(&identity, &student_id)
        .await?;

    Ok(Json(GradeAverageResponse {
        student_id,
        average,
    }))
}

pub async fn get_grade_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(grade_id): Path<String>,
) -> ApiResult<Json<GradeResponse>> {
    let grade = state
        .grade_service
        .get(&identity, Audience::SelfService, &grade_id)
        .await?;

    Ok(Json(GradeResponse::from(grade)))
}

pub async fn create_grade_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(payload): ApiJson<GradeRequest>,
) -> ApiResult<(StatusCode, Json<GradeResponse>)> {
    let grade = state
        .grade_service
        .create(&identity, Grade::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(GradeResponse::from(grade))))
}

pub async fn update_grade_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(grade_id): Path<String>,
    ApiJson(payload): ApiJson<GradeRequest>,
) -> ApiResult<Json<GradeResponse>> {
    let grade = state
        .grade_service
        .update(&identity, &grade_id, Grade::from(payload))
        .await?;

    Ok(Json(GradeResponse::from(grade)))
}

pub async fn delete_grade_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(grade_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.grade_service.delete(&identity, &grade_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

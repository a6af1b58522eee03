mod auth;
mod diary;
mod schedule;

use serde::Serialize;

pub use auth::{
    GroupResponse, IdentityResponse, SignInRequest, SignInResponse, SignUpRequest, UserResponse,
};
pub use diary::{
    AttendanceRequest, AttendanceResponse, DiaryListQuery, GradeAverageResponse, GradeRequest,
    GradeResponse, HomeworkRequest, HomeworkResponse,
};
pub use schedule::{DayScheduleQuery, ScheduleRequest, ScheduleResponse};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

use std::str::FromStr;

use chrono::NaiveDate;
use classbook_core::AppError;
use classbook_domain::{AttendanceRecord, AttendanceStatus, Grade, Homework};
use serde::{Deserialize, Serialize};

/// Optional narrowing accepted by the diary list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryListQuery {
    pub student_id: Option<String>,
    pub group_id: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub student_id: String,
    pub group_id: String,
    pub subject: String,
    pub value: u8,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub lesson_date: Option<NaiveDate>,
}

impl From<GradeRequest> for Grade {
    fn from(value: GradeRequest) -> Self {
        Self {
            id: String::new(),
            student_id: value.student_id,
            group_id: value.group_id,
            subject: value.subject,
            value: value.value,
            kind: value.kind,
            comment: value.comment,
            schedule_id: value.schedule_id,
            lesson_date: value.lesson_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponse {
    pub id: String,
    pub student_id: String,
    pub group_id: String,
    pub subject: String,
    pub value: u8,
    pub kind: Option<String>,
    pub comment: Option<String>,
    pub schedule_id: Option<String>,
    pub lesson_date: Option<NaiveDate>,
}

impl From<Grade> for GradeResponse {
    fn from(value: Grade) -> Self {
        Self {
            id: value.id,
            student_id: value.student_id,
            group_id: value.group_id,
            subject: value.subject,
            value: value.value,
            kind: value.kind,
            comment: value.comment,
            schedule_id: value.schedule_id,
            lesson_date: value.lesson_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeAverageResponse {
    pub student_id: String,
    pub average: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub student_id: String,
    pub group_id: String,
    pub subject: String,
    pub date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TryFrom<AttendanceRequest> for AttendanceRecord {
    type Error = AppError;

    fn try_from(value: AttendanceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: String::new(),
            student_id: value.student_id,
            group_id: value.group_id,
            subject: value.subject,
            date: value.date,
            status: AttendanceStatus::from_str(&value.status)?,
            comment: value.comment,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub id: String,
    pub student_id: String,
    pub group_id: String,
    pub subject: String,
    pub date: NaiveDate,
    pub status: &'static str,
    pub comment: Option<String>,
}

impl From<AttendanceRecord> for AttendanceResponse {
    fn from(value: AttendanceRecord) -> Self {
        Self {
            id: value.id,
            student_id: value.student_id,
            group_id: value.group_id,
            subject: value.subject,
            date: value.date,
            status: value.status.as_str(),
            comment: value.comment,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRequest {
    pub group_id: String,
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl From<HomeworkRequest> for Homework {
    fn from(value: HomeworkRequest) -> Self {
        Self {
            id: String::new(),
            group_id: value.group_id,
            subject: value.subject,
            title: value.title,
            description: value.description,
            student_id: value.student_id.filter(|student_id| !student_id.trim().is_empty()),
            due_date: value.due_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkResponse {
    pub id: String,
    pub group_id: String,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub student_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl From<Homework> for HomeworkResponse {
    fn from(value: Homework) -> Self {
        Self {
            id: value.id,
            group_id: value.group_id,
            subject: value.subject,
            title: value.title,
            description: value.description,
            student_id: value.student_id,
            due_date: value.due_date,
        }
    }
}

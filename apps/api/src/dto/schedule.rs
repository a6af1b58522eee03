use chrono::NaiveTime;
use classbook_application::ScheduleDraft;
use classbook_core::AppError;
use classbook_domain::{ScheduleEntry, TimeSlot, day_name, parse_day_of_week};
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%H:%M";

/// Lesson payload for create and update. Times are `HH:MM`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub group_id: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

impl TryFrom<ScheduleRequest> for ScheduleDraft {
    type Error = AppError;

    fn try_from(value: ScheduleRequest) -> Result<Self, Self::Error> {
        let slot = TimeSlot::new(
            parse_time("startTime", &value.start_time)?,
            parse_time("endTime", &value.end_time)?,
        )?;

        Ok(Self {
            group_id: value.group_id,
            day: parse_day_of_week(&value.day_of_week)?,
            slot,
            subject: value.subject,
            teacher: value.teacher,
            room: value.room,
        })
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("{field} must be HH:MM, got '{value}'")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: String,
    pub group_id: String,
    pub day_of_week: &'static str,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
}

impl From<ScheduleEntry> for ScheduleResponse {
    fn from(value: ScheduleEntry) -> Self {
        Self {
            id: value.id,
            group_id: value.group_id,
            day_of_week: day_name(value.day),
            start_time: value.slot.start().format(TIME_FORMAT).to_string(),
            end_time: value.slot.end().format(TIME_FORMAT).to_string(),
            subject: value.subject,
            teacher: value.teacher,
            room: value.room,
        }
    }
}

/// Query of the per-day schedule endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScheduleQuery {
    pub group_id: Option<String>,
}

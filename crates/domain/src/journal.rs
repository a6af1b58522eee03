//! Class journal records: grades, attendance and homework.

use std::str::FromStr;

use chrono::NaiveDate;
use classbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Lowest grade value on the school scale.
pub const GRADE_MIN: u8 = 1;

/// Highest grade value on the school scale.
pub const GRADE_MAX: u8 = 5;

/// Ownership view shared by every record the access rules narrow over.
pub trait ScopedRecord {
    /// Human-readable record kind used in messages.
    const KIND: &'static str;

    /// Returns the record identifier.
    fn record_id(&self) -> &str;

    /// Returns the owning student, `None` for group-wide records.
    fn student_id(&self) -> Option<&str>;

    /// Returns the owning group.
    fn group_id(&self) -> &str;

    /// Returns the discipline the record belongs to.
    fn subject(&self) -> &str;
}

/// Journal records that can be created and edited through the diary.
pub trait JournalRecord: ScopedRecord + Clone + Send + Sync + 'static {
    /// Replaces the record identifier.
    fn assign_id(&mut self, id: String);

    /// Checks record invariants before persistence.
    fn validate(&self) -> AppResult<()>;
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }

    Ok(())
}

/// Grade awarded to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Grade identifier.
    pub id: String,
    /// Graded student.
    pub student_id: String,
    /// Student's group.
    pub group_id: String,
    /// Discipline.
    pub subject: String,
    /// Value on the 1..=5 scale.
    pub value: u8,
    /// Kind of work (exam, test, homework, ...).
    pub kind: Option<String>,
    /// Teacher comment.
    pub comment: Option<String>,
    /// Lesson the grade was given in.
    pub schedule_id: Option<String>,
    /// Date of the lesson.
    pub lesson_date: Option<NaiveDate>,
}

impl ScopedRecord for Grade {
    const KIND: &'static str = "grade";

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn student_id(&self) -> Option<&str> {
        Some(self.student_id.as_str())
    }

    fn group_id(&self) -> &str {
        self.group_id.as_str()
    }

    fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

impl JournalRecord for Grade {
    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> AppResult<()> {
        require_text("student id", &self.student_id)?;
        require_text("group id", &self.group_id)?;
        require_text("subject", &self.subject)?;
        if !(GRADE_MIN..=GRADE_MAX).contains(&self.value) {
            return Err(AppError::Validation(format!(
                "grade value must be between {GRADE_MIN} and {GRADE_MAX}"
            )));
        }

        Ok(())
    }
}

/// Presence status recorded for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Student attended.
    Present,
    /// Student missed the lesson.
    Absent,
    /// Student was excused for illness.
    Sick,
    /// Student arrived late.
    Late,
}

impl AttendanceStatus {
    /// Returns the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Sick => "sick",
            Self::Late => "late",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "sick" => Ok(Self::Sick),
            "late" => Ok(Self::Late),
            other => Err(AppError::Validation(format!(
                "unknown attendance status '{other}'"
            ))),
        }
    }
}

/// Attendance mark for one student and lesson date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Record identifier.
    pub id: String,
    /// Student the mark belongs to.
    pub student_id: String,
    /// Student's group.
    pub group_id: String,
    /// Discipline.
    pub subject: String,
    /// Lesson date.
    pub date: NaiveDate,
    /// Presence status.
    pub status: AttendanceStatus,
    /// Teacher comment.
    pub comment: Option<String>,
}

impl ScopedRecord for AttendanceRecord {
    const KIND: &'static str = "attendance record";

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn student_id(&self) -> Option<&str> {
        Some(self.student_id.as_str())
    }

    fn group_id(&self) -> &str {
        self.group_id.as_str()
    }

    fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

impl JournalRecord for AttendanceRecord {
    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> AppResult<()> {
        require_text("student id", &self.student_id)?;
        require_text("group id", &self.group_id)?;
        require_text("subject", &self.subject)
    }
}

/// Homework assignment for a group or a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    /// Assignment identifier.
    pub id: String,
    /// Assigned group.
    pub group_id: String,
    /// Discipline.
    pub subject: String,
    /// Short title.
    pub title: String,
    /// Assignment details.
    pub description: Option<String>,
    /// Individual assignee; `None` assigns the whole group.
    pub student_id: Option<String>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

impl ScopedRecord for Homework {
    const KIND: &'static str = "homework";

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    fn group_id(&self) -> &str {
        self.group_id.as_str()
    }

    fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

impl JournalRecord for Homework {
    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> AppResult<()> {
        require_text("group id", &self.group_id)?;
        require_text("subject", &self.subject)?;
        require_text("title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AttendanceStatus, Grade, Homework, JournalRecord, ScopedRecord};

    fn grade(value: u8) -> Grade {
        Grade {
            id: "g-1".to_owned(),
            student_id: "s-1".to_owned(),
            group_id: "10a".to_owned(),
            subject: "Physics".to_owned(),
            value,
            kind: None,
            comment: None,
            schedule_id: None,
            lesson_date: None,
        }
    }

    #[test]
    fn grade_value_must_be_on_scale() {
        assert!(grade(0).validate().is_err());
        assert!(grade(1).validate().is_ok());
        assert!(grade(5).validate().is_ok());
        assert!(grade(6).validate().is_err());
    }

    #[test]
    fn grade_requires_subject() {
        let mut value = grade(4);
        value.subject = " ".to_owned();
        assert!(value.validate().is_err());
    }

    #[test]
    fn group_homework_has_no_owner() {
        let homework = Homework {
            id: "h-1".to_owned(),
            group_id: "10a".to_owned(),
            subject: "History".to_owned(),
            title: "Read chapter 3".to_owned(),
            description: None,
            student_id: None,
            due_date: None,
        };
        assert_eq!(homework.student_id(), None);
        assert!(homework.validate().is_ok());
    }

    #[test]
    fn attendance_status_parses_case_insensitively() {
        assert_eq!(
            AttendanceStatus::from_str("Sick").ok(),
            Some(AttendanceStatus::Sick)
        );
        assert!(AttendanceStatus::from_str("away").is_err());
    }
}

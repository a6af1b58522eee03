//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod journal;
mod role;
mod schedule;
mod user;

pub use journal::{
    AttendanceRecord, AttendanceStatus, GRADE_MAX, GRADE_MIN, Grade, Homework, JournalRecord,
    ScopedRecord,
};
pub use role::{
    GrantedAuthorities, RoleResolution, SUBJECT_KEYWORDS, resolve_authorities, resolve_role,
    subject_for_role,
};
pub use schedule::{
    ScheduleEntry, ScheduledInterval, TimeSlot, day_name, find_conflict, has_conflict,
    parse_day_of_week,
};
pub use user::{
    DEFAULT_GROUP_ID, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, normalize_group_id,
    validate_password,
};
